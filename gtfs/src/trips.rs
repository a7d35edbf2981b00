use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{RouteID, ServiceID, StopTime, TripID};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: TripID,
    pub route_id: RouteID,
    pub service_id: ServiceID,
    pub headsign: Option<String>,
    /// 0 or 1. Which one is inbound is up to the feed.
    pub direction_id: Option<u8>,

    // Sorted by stop_sequence
    pub stop_times: Vec<StopTime>,
}

impl Trip {
    pub fn headsign_or_empty(&self) -> &str {
        self.headsign.as_deref().unwrap_or("")
    }
}

pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<TripID, Trip>> {
    let mut trips = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if trips.contains_key(&rec.trip_id) {
            bail!("Duplicate {:?}", rec.trip_id);
        }
        let direction_id = match rec.direction_id {
            Some(x @ (0 | 1)) => Some(x),
            None => None,
            Some(x) => bail!("Unknown direction_id {x} for {:?}", rec.trip_id),
        };
        trips.insert(
            rec.trip_id.clone(),
            Trip {
                trip_id: rec.trip_id,
                route_id: rec.route_id,
                service_id: rec.service_id,
                headsign: rec.trip_headsign.filter(|x| !x.trim().is_empty()),
                direction_id,

                stop_times: Vec::new(),
            },
        );
    }
    Ok(trips)
}

#[derive(Deserialize)]
struct Record {
    trip_id: TripID,
    route_id: RouteID,
    service_id: ServiceID,
    trip_headsign: Option<String>,
    direction_id: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_optional_but_checked() {
        let input = "route_id,service_id,trip_id,trip_headsign,direction_id\n\
                     40-NAN,WK,t1,40 VIU,0\n\
                     40-NAN,WK,t2,,\n";
        let trips = load(input.as_bytes()).unwrap();
        assert_eq!(trips[&TripID::new("t1")].direction_id, Some(0));
        assert_eq!(trips[&TripID::new("t2")].direction_id, None);
        assert_eq!(trips[&TripID::new("t2")].headsign, None);

        let bad = "route_id,service_id,trip_id,direction_id\n40-NAN,WK,t1,2\n";
        assert!(load(bad.as_bytes()).is_err());
    }
}
