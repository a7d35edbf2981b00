use std::fmt;

use serde::{Deserialize, Serialize};

// Every GTFS ID is an opaque string, but mixing up a stop and a trip is an easy mistake.
macro_rules! string_id {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: Into<String>>(id: S) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(AgencyID);
string_id!(RouteID);
string_id!(ServiceID);
string_id!(StopID);
string_id!(TripID);
