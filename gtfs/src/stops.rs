use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::StopID;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: StopID,
    pub code: Option<String>,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Stop {
    /// Riders and the curated tables know stops by their code. Feeds without codes fall back to
    /// the ID.
    pub fn code_or_id(&self) -> &str {
        self.code.as_deref().unwrap_or_else(|| self.stop_id.as_str())
    }
}

pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<StopID, Stop>> {
    let mut stops = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if stops.contains_key(&rec.stop_id) {
            bail!("Duplicate {:?}", rec.stop_id);
        }
        stops.insert(
            rec.stop_id.clone(),
            Stop {
                stop_id: rec.stop_id,
                code: rec.stop_code.filter(|x| !x.trim().is_empty()),
                name: rec.stop_name,
                lat: rec.stop_lat,
                lon: rec.stop_lon,
            },
        );
    }
    Ok(stops)
}

#[derive(Deserialize)]
struct Record {
    stop_id: StopID,
    stop_code: Option<String>,
    stop_name: Option<String>,
    stop_lat: f64,
    stop_lon: f64,
    // TODO Assuming location_type = 0 or empty
}
