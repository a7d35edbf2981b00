use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::{AgencyID, RouteID};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Route {
    pub route_id: RouteID,
    /// Filled in from agency.txt when the feed only has one agency and leaves this blank.
    pub agency_id: Option<AgencyID>,
    pub route_type: RouteType,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub text_color: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum RouteType {
    Tram = 0,
    Subway = 1,
    Rail = 2,
    Bus = 3,
    Ferry = 4,
    CableTram = 5,
    AerialLift = 6,
    Funicular = 7,
    Trolleybus = 11,
    Monorail = 12,
}

impl Route {
    pub fn describe(&self) -> String {
        let name = self
            .short_name
            .as_ref()
            .or(self.long_name.as_ref())
            .or(self.description.as_ref())
            .map(|x| x.to_string())
            .unwrap_or_else(|| self.route_id.to_string());
        format!("{name} ({}, {:?})", self.route_id, self.route_type)
    }
}

pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<RouteID, Route>> {
    let mut routes = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if routes.contains_key(&rec.route_id) {
            bail!("Duplicate {:?}", rec.route_id);
        }
        routes.insert(
            rec.route_id.clone(),
            Route {
                route_id: rec.route_id,
                agency_id: rec.agency_id,
                route_type: rec.route_type,
                short_name: non_empty(rec.route_short_name),
                long_name: non_empty(rec.route_long_name),
                description: non_empty(rec.route_desc),
                color: non_empty(rec.route_color),
                text_color: non_empty(rec.route_text_color),
            },
        );
    }
    Ok(routes)
}

// Whitespace-only columns count as missing
fn non_empty(x: Option<String>) -> Option<String> {
    x.filter(|x| !x.trim().is_empty())
}

#[derive(Deserialize)]
struct Record {
    route_id: RouteID,
    agency_id: Option<AgencyID>,
    route_type: RouteType,
    route_short_name: Option<String>,
    route_long_name: Option<String>,
    route_desc: Option<String>,
    route_color: Option<String>,
    route_text_color: Option<String>,
}
