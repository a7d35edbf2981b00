//! Failures that mean the curated tables have fallen behind the live feed. A maintainer has to fix
//! the tables; guessing would put wrong labels in front of riders.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgencyError {
    /// Neither the short name nor the route ID is a route number
    #[error("route {route} has no numeric short name or route ID")]
    BadRouteNumber { route: String },

    /// A route without a feed color is missing from the color table
    #[error("unexpected route color for route {number} ({route}): add it to the color table")]
    UnknownRouteColor { route: String, number: u32 },

    /// Two labels for one route and direction aren't covered by any merge rule
    #[error(
        "unexpected trips to merge on route {route}: {first_trip} ({first_label:?}) & {second_trip} ({second_label:?})"
    )]
    UnmappedMerge {
        route: u32,
        first_trip: String,
        first_label: String,
        second_trip: String,
        second_label: String,
    },

    /// The stop code doubles as the stop's numeric ID
    #[error("stop {stop} has no numeric stop code")]
    BadStopCode { stop: String },

    /// Output stops are keyed by number, so two codes like "0110226" and "110226" can't both stay
    #[error("stop codes {first:?} and {second:?} both become stop {id}")]
    DuplicateStopId {
        id: u32,
        first: String,
        second: String,
    },

    /// An override route's trip doesn't clearly follow either anchor sequence
    #[error("trip {trip} on route {route} matches neither direction's anchor stops")]
    UnsplittableTrip { route: u32, trip: String },
}
