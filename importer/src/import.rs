use std::collections::BTreeMap;

use anyhow::Result;

use agency::{merge_stop_sequences, AgencyError, AssignedTrip, DirectionKind, RdnTransitTools};
use gtfs::{Route, RouteID, Service, Trip, GTFS};

/// The feed after filtering and cleanup, ready to write
#[derive(Default)]
pub struct Normalized {
    pub routes: BTreeMap<u32, NormalizedRoute>,
    pub directions: BTreeMap<(u32, u8), Direction>,
    pub stops: BTreeMap<u32, NormalizedStop>,
    pub services: Vec<Service>,
}

pub struct NormalizedRoute {
    pub id: u32,
    pub short_name: String,
    pub long_name: String,
    pub color: String,
}

/// All trips of one route going one way, sharing one label and one stop order
pub struct Direction {
    pub route: u32,
    pub direction: u8,
    pub headsign: String,
    /// Only for routes split by anchor stops
    pub kind: Option<DirectionKind>,
    pub trips: Vec<AssignedTrip>,
    /// Stop IDs
    pub stops: Vec<u32>,
}

pub struct NormalizedStop {
    pub id: u32,
    pub code: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

// A trip that survived filtering, before merging
struct KeptTrip<'a> {
    route_id: &'a RouteID,
    assigned: AssignedTrip,
    // Stop codes, in order
    stops: Vec<String>,
}

pub fn import(gtfs: &GTFS, tools: &mut RdnTransitTools) -> Result<Normalized> {
    tools.prepare(gtfs);
    if tools.excluding_all() {
        warn!("No useful services; excluding everything");
        return Ok(Normalized::default());
    }

    let mut normalized = Normalized::default();
    let mut route_numbers: BTreeMap<&RouteID, u32> = BTreeMap::new();
    let mut first_routes: BTreeMap<u32, &Route> = BTreeMap::new();
    for route in gtfs.routes.values() {
        if tools.exclude_route(route) {
            debug!("Skipping {}", route.describe());
            continue;
        }
        let number = tools.route_id(route)?;
        route_numbers.insert(&route.route_id, number);
        if normalized.routes.contains_key(&number) {
            warn!("Route {number} appears more than once; keeping the first");
            continue;
        }
        first_routes.insert(number, route);
        normalized.routes.insert(
            number,
            NormalizedRoute {
                id: number,
                short_name: route
                    .short_name
                    .clone()
                    .unwrap_or_else(|| number.to_string()),
                long_name: tools.route_long_name(route),
                // Filled in once we know the route keeps some trips
                color: String::new(),
            },
        );
    }

    let mut per_direction: BTreeMap<(u32, u8), Vec<KeptTrip>> = BTreeMap::new();
    let mut stop_ids: BTreeMap<String, u32> = BTreeMap::new();
    for trip in gtfs.trips.values() {
        let number = match route_numbers.get(&trip.route_id) {
            Some(number) => *number,
            None => continue,
        };
        if tools.exclude_trip(trip) {
            continue;
        }
        let assigned = assign(gtfs, tools, number, trip)?;

        let mut stops = Vec::new();
        for stop in gtfs.stops_of(trip) {
            let code = stop.code_or_id().to_string();
            if !stop_ids.contains_key(&code) {
                let id = tools.stop_id(stop)?;
                stop_ids.insert(code.clone(), id);
                if let Some(existing) = normalized.stops.get(&id) {
                    let err = AgencyError::DuplicateStopId {
                        id,
                        first: existing.code.clone(),
                        second: code.clone(),
                    };
                    if !tools.config().good_enough {
                        return Err(err.into());
                    }
                    warn!("{err}; keeping the first");
                    stops.push(code);
                    continue;
                }
                normalized.stops.insert(
                    id,
                    NormalizedStop {
                        id,
                        code: code.clone(),
                        name: tools.clean_stop_name(stop),
                        lat: stop.lat,
                        lon: stop.lon,
                    },
                );
            }
            stops.push(code);
        }

        per_direction
            .entry((number, assigned.headsign.direction))
            .or_insert_with(Vec::new)
            .push(KeptTrip {
                route_id: &trip.route_id,
                assigned,
                stops,
            });
    }

    for ((number, direction), trips) in per_direction {
        let headsign = merge_labels(tools, &trips)?;
        let order = merge_stop_sequences(
            trips.iter().map(|trip| trip.stops.clone()).collect(),
            |stop1, stop2| tools.compare_early(number, direction, stop1, stop2),
        );
        normalized.directions.insert(
            (number, direction),
            Direction {
                route: number,
                direction,
                headsign,
                kind: tools.config().split_spec(number).map(|spec| spec.kind),
                trips: trips.into_iter().map(|trip| trip.assigned).collect(),
                stops: order.iter().map(|code| stop_ids[code]).collect(),
            },
        );
    }

    // Routes with no trips left aren't worth showing
    normalized
        .routes
        .retain(|number, _| normalized.directions.keys().any(|(route, _)| route == number));
    for (number, route) in normalized.routes.iter_mut() {
        route.color = tools.route_color(first_routes[number])?;
    }

    for service in gtfs.calendar.services.values() {
        if tools.exclude_calendar(service) {
            debug!("Dropping {}: {}", service.service_id, service.describe());
            continue;
        }
        normalized.services.push(service.clone());
    }

    Ok(normalized)
}

fn assign(
    gtfs: &GTFS,
    tools: &mut RdnTransitTools,
    number: u32,
    trip: &Trip,
) -> Result<AssignedTrip> {
    let route = &gtfs.routes[&trip.route_id];
    let headsign = match tools.set_trip_headsign(route, trip)? {
        Some(headsign) => headsign,
        None => tools
            .split_direction(number, trip, gtfs)?
            .ok_or_else(|| anyhow!("route {number} has no direction split for {}", trip.trip_id))?,
    };
    Ok(AssignedTrip {
        trip_id: trip.trip_id.clone(),
        headsign,
    })
}

// Collapse every label on a route direction into one, pair by pair
fn merge_labels(tools: &RdnTransitTools, trips: &[KeptTrip]) -> Result<String> {
    let mut current = trips[0].assigned.clone();
    for trip in &trips[1..] {
        if trip.assigned.headsign.label == current.headsign.label {
            continue;
        }
        current.headsign.label = tools.merge_headsign(trip.route_id, &current, &trip.assigned)?;
    }
    Ok(current.headsign.label)
}
