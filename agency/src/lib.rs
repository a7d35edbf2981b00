//! Rules for turning the Regional District of Nanaimo's raw GTFS feed into rider-facing data:
//! which rows belong to the operator, route numbers and colors, cleaned names, direction labels,
//! and the hand-curated direction splits for loop routes.

#[macro_use]
extern crate log;

pub mod clean;
mod config;
mod error;
mod filter;
mod headsign;
pub mod names;
mod split;
mod tools;

pub use config::AgencyConfig;
pub use error::AgencyError;
pub use filter::{has_service_token, is_not_in_service};
pub use headsign::{default_merge, AssignedTrip, Compass, DirectionPolicy, Headsign, MergeRule};
pub use split::{merge_stop_sequences, DirectionKind, DirectionSpec, RouteDirectionSpec};
pub use tools::RdnTransitTools;
