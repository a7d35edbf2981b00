//! Label cleanup shared by every agency: street types, "and"/"at", spacing and casing. Agency
//! specific rules live in `names`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
    static ref PAREN_OPEN_INNER: Regex = Regex::new(r"\(\s+").unwrap();
    static ref PAREN_CLOSE_INNER: Regex = Regex::new(r"\s+\)").unwrap();
    static ref PAREN_OPEN: Regex = Regex::new(r"\s*\(\s*").unwrap();
    static ref PAREN_CLOSE: Regex = Regex::new(r"\s*\)\s*").unwrap();
    static ref AND: Regex = Regex::new(r"(?i)\band\b").unwrap();
    static ref AMPERSAND: Regex = Regex::new(r"\s*&\s*").unwrap();
    static ref AT: Regex = Regex::new(r"(?i)\bat\b").unwrap();
    static ref SLASH: Regex = Regex::new(r"\s*/\s*").unwrap();
    static ref STREET_TYPES: Vec<(Regex, &'static str)> = word_table(&[
        ("ave", "Avenue"),
        ("blvd", "Boulevard"),
        ("cres", "Crescent"),
        ("ctr", "Centre"),
        ("dr", "Drive"),
        ("hwy", "Highway"),
        ("pkwy", "Parkway"),
        ("pl", "Place"),
        ("rd", "Road"),
        ("st", "Street"),
    ]);
    static ref ORDINALS: Vec<(Regex, &'static str)> = word_table(&[
        ("first", "1st"),
        ("second", "2nd"),
        ("third", "3rd"),
        ("fourth", "4th"),
        ("fifth", "5th"),
        ("sixth", "6th"),
        ("seventh", "7th"),
        ("eighth", "8th"),
        ("ninth", "9th"),
        ("tenth", "10th"),
    ]);
}

// An abbreviation may carry a trailing period
fn word_table(words: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    words
        .iter()
        .map(|(from, to)| (Regex::new(&format!(r"(?i)\b{from}\b\.?")).unwrap(), *to))
        .collect()
}

/// Rule pipelines feed into themselves: stripping a prefix can expose another, and casing depends
/// on what's left. Repeat a pass until the text stops changing, so the result is stable under
/// another cleaning.
pub fn converge<F: Fn(&str) -> String>(text: &str, pass: F) -> String {
    const MAX_PASSES: usize = 16;

    let mut current = pass(text);
    for _ in 0..MAX_PASSES {
        let next = pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
    warn!("{text:?} didn't settle after {MAX_PASSES} cleaning passes");
    current
}

/// True if there's at least one letter and none are lower-case. Digits, spaces and punctuation
/// don't count either way.
pub fn is_uppercase_only(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

/// "A and B" becomes "A & B"
pub fn clean_and(text: &str) -> String {
    let text = AND.replace_all(text, "&");
    AMPERSAND.replace_all(&text, " & ").into_owned()
}

/// "A at B" becomes "A / B"
pub fn clean_at(text: &str) -> String {
    AT.replace_all(text, "/").into_owned()
}

pub fn clean_slashes(text: &str) -> String {
    SLASH.replace_all(text, " / ").into_owned()
}

/// Always one space outside parentheses, none inside
pub fn clean_parentheses(text: &str) -> String {
    let text = PAREN_OPEN.replace_all(text, " (");
    PAREN_CLOSE.replace_all(&text, ") ").into_owned()
}

/// Spelled-out ordinals become numbers: "First" is "1st"
pub fn clean_numbers(text: &str) -> String {
    replace_words(text, &ORDINALS)
}

/// Abbreviated street types are spelled out: "St" is "Street"
pub fn clean_street_types(text: &str) -> String {
    replace_words(text, &STREET_TYPES)
}

fn replace_words(text: &str, table: &[(Regex, &'static str)]) -> String {
    let mut text = text.to_string();
    for (pattern, replacement) in table {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text
}

/// Collapses whitespace, tightens parentheses, trims, and capitalizes the first letter of every
/// word. The rest of each word is left alone, so "McRobb" survives.
pub fn clean_label(text: &str) -> String {
    let text = SPACES.replace_all(text, " ");
    let text = PAREN_OPEN_INNER.replace_all(&text, "(");
    let text = PAREN_CLOSE_INNER.replace_all(&text, ")");
    capitalize_words(text.trim())
}

fn capitalize_words(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if word_start {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        word_start = c.is_whitespace() || matches!(c, '-' | '/' | '(');
    }
    result
}

/// Words matching one of the acronyms (ignoring case and surrounding punctuation) are
/// upper-cased. Expects single spaces between words, as `clean_label` leaves them.
pub fn keep_acronyms(text: &str, acronyms: &[&str]) -> String {
    text.split(' ')
        .map(|word| {
            let core = word.trim_matches(|c: char| !c.is_alphanumeric());
            if !core.is_empty() && acronyms.iter().any(|a| a.eq_ignore_ascii_case(core)) {
                word.replacen(core, &core.to_uppercase(), 1)
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
