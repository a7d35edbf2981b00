#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod calendar;
mod ids;
mod routes;
mod stop_times;
mod stops;
mod trips;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;
use zip::ZipArchive;

pub use calendar::{parse_date, Calendar, DaysOfWeek, Service, WeeklyPattern};
pub use ids::{AgencyID, RouteID, ServiceID, StopID, TripID};
pub use routes::{Route, RouteType};
pub use stop_times::StopTime;
pub use stops::Stop;
pub use trips::Trip;

pub struct GTFS {
    pub routes: BTreeMap<RouteID, Route>,
    pub trips: BTreeMap<TripID, Trip>,
    pub stops: BTreeMap<StopID, Stop>,
    pub calendar: Calendar,
}

impl GTFS {
    /// Loads a feed from a .zip archive or from a directory of .txt files.
    pub fn load(path: &str) -> Result<Self> {
        let mut source = if path.ends_with(".zip") {
            Source::Zip(ZipArchive::new(fs_err::File::open(path)?)?)
        } else {
            Source::Dir(PathBuf::from(path))
        };
        Self::load_from(&mut source).map_err(|err| anyhow!("loading {path}: {err:#}"))
    }

    fn load_from(source: &mut Source) -> Result<Self> {
        let stops = stops::load(source.required("stops.txt")?.as_slice())?;
        let mut routes = routes::load(source.required("routes.txt")?.as_slice())?;
        let mut trips = trips::load(source.required("trips.txt")?.as_slice())?;
        let mut stop_times =
            stop_times::load(source.required("stop_times.txt")?.as_slice(), &stops)?;

        if let Some(bytes) = source.optional("agency.txt")? {
            fill_single_agency(&mut routes, bytes.as_slice())?;
        }

        for trip in trips.values_mut() {
            if !routes.contains_key(&trip.route_id) {
                bail!("{:?} belongs to unknown {:?}", trip.trip_id, trip.route_id);
            }
            match stop_times.remove(&trip.trip_id) {
                Some(list) => {
                    trip.stop_times = list;
                }
                None => warn!("{:?} has no stop times", trip.trip_id),
            }
        }
        if !stop_times.is_empty() {
            warn!(
                "Stop times defined for unknown trips: {:?}",
                stop_times.keys()
            );
        }

        let mut calendar = match source.optional("calendar.txt")? {
            Some(bytes) => calendar::load(bytes.as_slice())?,
            None => Calendar::default(),
        };
        if let Some(bytes) = source.optional("calendar_dates.txt")? {
            calendar::load_exceptions(&mut calendar, bytes.as_slice())?;
        }
        if calendar.services.is_empty() {
            bail!("Neither calendar.txt nor calendar_dates.txt define any service");
        }

        info!(
            "Loaded {} routes, {} trips, {} stops, {} services",
            routes.len(),
            trips.len(),
            stops.len(),
            calendar.services.len()
        );
        Ok(Self {
            routes,
            trips,
            stops,
            calendar,
        })
    }

    /// The stops a trip visits, in order
    pub fn stops_of<'a>(&'a self, trip: &'a Trip) -> impl Iterator<Item = &'a Stop> + 'a {
        trip.stop_times
            .iter()
            .filter_map(move |st| self.stops.get(&st.stop_id))
    }
}

enum Source {
    Zip(ZipArchive<fs_err::File>),
    Dir(PathBuf),
}

impl Source {
    fn optional(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut bytes = Vec::new();
        match self {
            Source::Zip(archive) => match archive.by_name(name) {
                Ok(mut file) => {
                    file.read_to_end(&mut bytes)
                        .map_err(|err| anyhow!("{name}: {err}"))?;
                }
                Err(zip::result::ZipError::FileNotFound) => return Ok(None),
                Err(err) => bail!("{name}: {err}"),
            },
            Source::Dir(dir) => {
                let path = dir.join(name);
                if !path.exists() {
                    return Ok(None);
                }
                bytes = fs_err::read(path)?;
            }
        }
        Ok(Some(bytes))
    }

    fn required(&mut self, name: &str) -> Result<Vec<u8>> {
        match self.optional(name)? {
            Some(bytes) => Ok(bytes),
            None => bail!("{name} is missing"),
        }
    }
}

// agency_id is optional in routes.txt when the feed only has one agency
fn fill_single_agency<R: Read>(routes: &mut BTreeMap<RouteID, Route>, reader: R) -> Result<()> {
    let mut agencies = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: AgencyRecord = rec?;
        agencies.push(rec.agency_id);
    }
    if let [Some(agency_id)] = agencies.as_slice() {
        for route in routes.values_mut() {
            if route.agency_id.is_none() {
                route.agency_id = Some(agency_id.clone());
            }
        }
    }
    Ok(())
}

#[derive(Deserialize)]
struct AgencyRecord {
    agency_id: Option<AgencyID>,
}
