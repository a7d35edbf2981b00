use gtfs::{ServiceID, Trip};

const NOT_IN_SERVICE: &str = "not in service";

/// Deadheading trips are published with a "Not In Service" sign, either on the trip or on some of
/// its stops.
pub fn is_not_in_service(trip: &Trip) -> bool {
    mentions_not_in_service(trip.headsign_or_empty())
        || trip
            .stop_times
            .iter()
            .filter_map(|st| st.stop_headsign.as_deref())
            .any(mentions_not_in_service)
}

/// Without a token, every service qualifies.
pub fn has_service_token(service_id: &ServiceID, token: Option<&str>) -> bool {
    match token {
        Some(token) => service_id.as_str().contains(token),
        None => true,
    }
}

fn mentions_not_in_service(headsign: &str) -> bool {
    headsign.to_lowercase().contains(NOT_IN_SERVICE)
}
