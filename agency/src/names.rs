//! Cleanup rules for the names in the RDN feed. Order matters within each pass; later rules assume
//! the earlier ones already ran.

use lazy_static::lazy_static;
use regex::Regex;

use crate::clean;

/// Stay upper-case through re-casing
pub const ACRONYMS: &[&str] = &[
    "BC", "NRGH", "VIU", "YMCA", "N", "S", "E", "W", "NE", "NW", "SE", "SW",
];

pub const EXCHANGE_SHORT: &str = "Exch";
pub const VI_UNIVERSITY_SHORT: &str = "VIU";

lazy_static! {
    static ref STARTS_WITH_DASH: Regex = Regex::new(r"^\s*-\s+").unwrap();

    static ref BEACH: Regex = Regex::new(r"(?i)\bbch\b").unwrap();
    static ref CINNABAR: Regex = Regex::new(r"(?i)\bcinnibar\b").unwrap();
    static ref SHUTTLE: Regex = Regex::new(r"(?i)\bshutlle\b").unwrap();
    static ref EXCHANGE: Regex = Regex::new(r"(?i)\bexchange\b").unwrap();
    static ref VI_UNIVERSITY: Regex = Regex::new(r"(?i)\b(vi university|viu)\b").unwrap();

    static ref ENDS_WITH_VIA: Regex = Regex::new(r"(?i) via .*$").unwrap();
    static ref STARTS_WITH_TO: Regex = Regex::new(r"(?i)^.* to ").unwrap();
    static ref STARTS_WITH_NUMBER: Regex = Regex::new(r"^\d+( -)?(\S*)").unwrap();
    static ref ORDINAL_SUFFIX: Regex = Regex::new(r"(?i)^(st|nd|rd|th)\b").unwrap();
    static ref ENDS_WITH_BAY: Regex = Regex::new(r"(?i)\s+bay\s+[a-z]\s*$").unwrap();

    static ref STARTS_WITH_IMPL: Regex = Regex::new(r"(?i)^\s*\(-IMPL-\)").unwrap();
    static ref STARTS_WITH_BOUND: Regex =
        Regex::new(r"(?i)^\s*(east|west|north|south)(bound|boudn)\b").unwrap();
}

pub fn clean_route_long_name(text: &str) -> String {
    clean::converge(text, |text| {
        let text = lowercase_if_shouting(text);
        let text = STARTS_WITH_DASH.replace(&text, "");
        let text = clean::clean_slashes(&text);
        let text = clean::clean_numbers(&text);
        let text = clean::clean_street_types(&text);
        finish(&text)
    })
}

pub fn clean_trip_headsign(text: &str) -> String {
    clean::converge(text, |text| {
        let text = lowercase_if_shouting(text);
        let text = BEACH.replace_all(&text, "Beach");
        let text = CINNABAR.replace_all(&text, "Cinnabar");
        let text = SHUTTLE.replace_all(&text, "Shuttle");
        let text = EXCHANGE.replace_all(&text, EXCHANGE_SHORT);
        let text = VI_UNIVERSITY.replace_all(&text, VI_UNIVERSITY_SHORT);
        let text = ENDS_WITH_VIA.replace(&text, "");
        let text = STARTS_WITH_TO.replace(&text, "");
        let text = clean::clean_and(&text);
        let text = clean::clean_at(&text);
        let text = clean::clean_parentheses(&text);
        let text = strip_route_number(&text);
        let text = ENDS_WITH_BAY.replace(&text, "");
        let text = clean::clean_street_types(&text);
        finish(&text)
    })
}

pub fn clean_stop_name(text: &str) -> String {
    clean::converge(text, |text| {
        let text = lowercase_if_shouting(text);
        let text = STARTS_WITH_IMPL.replace(&text, "");
        let text = STARTS_WITH_BOUND.replace(&text, "");
        let text = clean::clean_at(&text);
        let text = EXCHANGE.replace_all(&text, EXCHANGE_SHORT);
        let text = clean::clean_street_types(&text);
        finish(&text)
    })
}

// "40 VIU" and "15 - VIU" lose the route number, but "2nd Avenue" is a street
fn strip_route_number(text: &str) -> String {
    match STARTS_WITH_NUMBER.captures(text) {
        Some(caps) if !ORDINAL_SUFFIX.is_match(&caps[2]) => text[caps[0].len()..].to_string(),
        _ => text.to_string(),
    }
}

fn lowercase_if_shouting(text: &str) -> String {
    if clean::is_uppercase_only(text) {
        text.to_lowercase()
    } else {
        text.to_string()
    }
}

fn finish(text: &str) -> String {
    clean::keep_acronyms(&clean::clean_label(text), ACRONYMS)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn trip_headsigns() {
        assert_eq!(
            clean_trip_headsign("EXCHANGE to WOODGROVE via HWY"),
            "Woodgrove"
        );
        assert_eq!(clean_trip_headsign("40 VIU via Wakesiah"), "VIU");
        assert_eq!(clean_trip_headsign("BC FERRIES"), "BC Ferries");
        assert_eq!(
            clean_trip_headsign("7 Cinnibar and Cedar"),
            "Cinnabar & Cedar"
        );
        assert_eq!(clean_trip_headsign("15 - VI University"), "VIU");
        assert_eq!(clean_trip_headsign("40 2nd Avenue"), "2nd Avenue");
        assert_eq!(clean_trip_headsign("15 - 5th Street"), "5th Street");
        assert_eq!(clean_trip_headsign("2nd Avenue"), "2nd Avenue");
        assert_eq!(clean_trip_headsign("15A Downtown"), "Downtown");
        assert_eq!(
            clean_trip_headsign("Country Club Exchange Bay A"),
            "Country Club Exch"
        );
        assert_eq!(clean_trip_headsign("Qualicum Bch"), "Qualicum Beach");
        assert_eq!(clean_trip_headsign("Ferry Shutlle"), "Ferry Shuttle");
        assert_eq!(clean_trip_headsign("A VIU"), "A VIU");
        assert_eq!(
            clean_trip_headsign("Woodgrove(Express)"),
            "Woodgrove (Express)"
        );
        // Departure Bay is a place, not a bay letter
        assert_eq!(
            clean_trip_headsign("Departure Bay Ferry"),
            "Departure Bay Ferry"
        );
        assert_eq!(clean_trip_headsign(""), "");
    }

    #[test]
    fn stop_names() {
        assert_eq!(
            clean_stop_name("Eastbound Exchange St at Albert"),
            "Exch Street / Albert"
        );
        assert_eq!(
            clean_stop_name("Westboudn Pintail at Eaglecrest Dr"),
            "Pintail / Eaglecrest Drive"
        );
        assert_eq!(
            clean_stop_name("(-IMPL-)Woodgrove Centre Exchange Bay D"),
            "Woodgrove Centre Exch Bay D"
        );
        assert_eq!(
            clean_stop_name("Wembley Mall AT Wembley Rd"),
            "Wembley Mall / Wembley Road"
        );
        assert_eq!(
            clean_stop_name("Southbound Jones at Fern Rd W"),
            "Jones / Fern Road W"
        );
        assert_eq!(clean_stop_name("NANAIMO SENIORS VILLAGE"), "Nanaimo Seniors Village");
    }

    #[test]
    fn route_long_names() {
        assert_eq!(clean_route_long_name("- Cinnabar / Cedar"), "Cinnabar / Cedar");
        assert_eq!(
            clean_route_long_name("Downtown/Country Club"),
            "Downtown / Country Club"
        );
        assert_eq!(clean_route_long_name("Third St"), "3rd Street");
        assert_eq!(clean_route_long_name("VIU EXPRESS"), "VIU Express");
    }

    const VOCABULARY: &[&str] = &[
        "EXCHANGE", "Exchange", "exch", "to", "TO", "via", "VIA", "Woodgrove", "WOODGROVE",
        "VIU", "vi university", "Bch", "cinnibar", "shutlle", "and", "&", "at", "AT", "Bay",
        "A", "D", "(", ")", "St", "Ave.", "Hwy", "40", "15A", "7 -", "-", "/", "Eastbound",
        "westboudn", "(-IMPL-)", "BC", "Ferries", "Country", "Club", "Downtown", "first",
        "McRobb", "2nd", "5th", "1st", "3RD", "Avenue", "  ",
    ];

    fn phrases() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(VOCABULARY), 0..8)
            .prop_map(|words| words.join(" "))
    }

    proptest! {
        #[test]
        fn trip_headsign_is_idempotent(text in phrases()) {
            let once = clean_trip_headsign(&text);
            prop_assert_eq!(clean_trip_headsign(&once), once);
        }

        #[test]
        fn stop_name_is_idempotent(text in phrases()) {
            let once = clean_stop_name(&text);
            prop_assert_eq!(clean_stop_name(&once), once);
        }

        #[test]
        fn route_long_name_is_idempotent(text in phrases()) {
            let once = clean_route_long_name(&text);
            prop_assert_eq!(clean_route_long_name(&once), once);
        }

        #[test]
        fn ascii_headsigns_are_idempotent(text in "[a-zA-Z0-9 &()/-]{0,30}") {
            let once = clean_trip_headsign(&text);
            prop_assert_eq!(clean_trip_headsign(&once), once);
        }
    }
}
