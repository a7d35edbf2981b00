use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{Stop, StopID, TripID};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StopTime {
    pub stop_id: StopID,
    pub stop_sequence: usize,
    pub stop_headsign: Option<String>,
}

pub fn load<R: std::io::Read>(
    reader: R,
    stops: &BTreeMap<StopID, Stop>,
) -> Result<BTreeMap<TripID, Vec<StopTime>>> {
    let mut stop_times: BTreeMap<TripID, Vec<StopTime>> = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if !stops.contains_key(&rec.stop_id) {
            bail!("{:?} visits unknown {:?}", rec.trip_id, rec.stop_id);
        }
        stop_times
            .entry(rec.trip_id)
            .or_insert_with(Vec::new)
            .push(StopTime {
                stop_id: rec.stop_id,
                stop_sequence: rec.stop_sequence,
                stop_headsign: rec.stop_headsign.filter(|x| !x.trim().is_empty()),
            });
    }

    // Sort by stop_sequence, in case the file isn't in order
    for list in stop_times.values_mut() {
        list.sort_by_key(|st| st.stop_sequence);
    }
    Ok(stop_times)
}

#[derive(Deserialize)]
struct Record {
    trip_id: TripID,
    stop_id: StopID,
    stop_sequence: usize,
    stop_headsign: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str) -> (StopID, Stop) {
        (
            StopID::new(id),
            Stop {
                stop_id: StopID::new(id),
                code: None,
                name: None,
                lat: 49.16,
                lon: -123.94,
            },
        )
    }

    #[test]
    fn sorted_by_sequence() {
        let stops: BTreeMap<_, _> = vec![stop("a"), stop("b"), stop("c")].into_iter().collect();
        let input = "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
                     t1,08:10:00,08:10:00,c,3\n\
                     t1,08:00:00,08:00:00,a,1\n\
                     t1,08:05:00,08:05:00,b,2\n";
        let stop_times = load(input.as_bytes(), &stops).unwrap();
        let order: Vec<&str> = stop_times[&TripID::new("t1")]
            .iter()
            .map(|st| st.stop_id.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn unknown_stop_is_an_error() {
        let stops: BTreeMap<_, _> = vec![stop("a")].into_iter().collect();
        let input = "trip_id,stop_id,stop_sequence\nt1,zzz,1\n";
        assert!(load(input.as_bytes(), &stops).is_err());
    }
}
