use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use regex::Regex;

use gtfs::{Route, RouteID, Service, ServiceID, Stop, Trip, GTFS};

use crate::headsign::{default_merge, AssignedTrip, DirectionPolicy, Headsign};
use crate::{filter, names, AgencyConfig, AgencyError};

lazy_static! {
    // Realtime route IDs look like "40-NAN"
    static ref ROUTE_ID_SUFFIX: Regex = Regex::new(r"-[A-Za-z]+$").unwrap();
}

/// The operator-specific hooks the importer calls while transforming a feed. `prepare` must run
/// first, so the service filters know which services matter.
pub struct RdnTransitTools {
    config: AgencyConfig,
    useful_services: BTreeSet<ServiceID>,
    // Filled in by set_trip_headsign, read by merge_headsign
    route_numbers: BTreeMap<RouteID, u32>,
}

impl RdnTransitTools {
    pub fn new(config: AgencyConfig) -> Self {
        Self {
            config,
            useful_services: BTreeSet::new(),
            route_numbers: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &AgencyConfig {
        &self.config
    }

    /// Works out which services are used by trips this operator actually runs.
    pub fn prepare(&mut self, gtfs: &GTFS) {
        let mut useful = BTreeSet::new();
        for trip in gtfs.trips.values() {
            let route = match gtfs.routes.get(&trip.route_id) {
                Some(route) => route,
                None => continue,
            };
            if self.exclude_route(route)
                || filter::is_not_in_service(trip)
                || !self.has_service_token(&trip.service_id)
            {
                continue;
            }
            if let Some(date) = self.config.run_date {
                let current = gtfs
                    .calendar
                    .services
                    .get(&trip.service_id)
                    .map(|service| service.runs_on_or_after(date))
                    .unwrap_or(false);
                if !current {
                    continue;
                }
            }
            useful.insert(trip.service_id.clone());
        }
        debug!("Useful services: {:?}", useful);
        info!(
            "{} of {} services are useful",
            useful.len(),
            gtfs.calendar.services.len()
        );
        self.useful_services = useful;
    }

    pub fn useful_services(&self) -> &BTreeSet<ServiceID> {
        &self.useful_services
    }

    pub fn excluding_all(&self) -> bool {
        self.useful_services.is_empty()
    }

    pub fn exclude_route(&self, route: &Route) -> bool {
        route.agency_id.as_ref().map(|x| x.as_str()) != Some(self.config.agency_id.as_str())
    }

    pub fn exclude_trip(&self, trip: &Trip) -> bool {
        !self.useful_services.contains(&trip.service_id)
            || !self.has_service_token(&trip.service_id)
            || filter::is_not_in_service(trip)
    }

    pub fn exclude_calendar(&self, service: &Service) -> bool {
        !self.useful_services.contains(&service.service_id)
    }

    pub fn exclude_calendar_date(&self, service_id: &ServiceID) -> bool {
        !self.useful_services.contains(service_id)
    }

    fn has_service_token(&self, service_id: &ServiceID) -> bool {
        filter::has_service_token(service_id, self.config.service_id_token.as_deref())
    }

    /// The route number riders know. Routes without a usable short name fall back to the numeric
    /// part of the route ID.
    pub fn route_id(&self, route: &Route) -> Result<u32, AgencyError> {
        if let Some(number) = route
            .short_name
            .as_ref()
            .and_then(|x| x.trim().parse::<u32>().ok())
        {
            return Ok(number);
        }
        ROUTE_ID_SUFFIX
            .replace(route.route_id.as_str(), "")
            .parse::<u32>()
            .map_err(|_| AgencyError::BadRouteNumber {
                route: route.route_id.to_string(),
            })
    }

    pub fn route_color(&self, route: &Route) -> Result<String, AgencyError> {
        if let Some(ref color) = route.color {
            return Ok(color.clone());
        }
        let number = self.route_id(route)?;
        if let Some(color) = self.config.route_colors.get(&number) {
            return Ok(color.clone());
        }
        if self.config.good_enough {
            warn!(
                "No color for route {number} ({}), using {}",
                route.route_id, self.config.fallback_color
            );
            return Ok(self.config.fallback_color.clone());
        }
        Err(AgencyError::UnknownRouteColor {
            route: route.route_id.to_string(),
            number,
        })
    }

    pub fn route_long_name(&self, route: &Route) -> String {
        names::clean_route_long_name(route.long_name.as_deref().unwrap_or(""))
    }

    pub fn agency_color(&self) -> &str {
        &self.config.agency_color
    }

    /// None for routes whose trips get split by anchor stops instead. Remembers the route's
    /// number for merging later.
    pub fn set_trip_headsign(
        &mut self,
        route: &Route,
        trip: &Trip,
    ) -> Result<Option<Headsign>, AgencyError> {
        let number = self.route_id(route)?;
        self.route_numbers.insert(route.route_id.clone(), number);

        // Trips without a direction are treated as the first one
        let direction = trip.direction_id.unwrap_or(0);
        let headsign = match self.config.policy(number) {
            DirectionPolicy::Split(_) => None,
            DirectionPolicy::StaticLabels(labels) => Some(Headsign::new(
                direction,
                labels[usize::from(direction)].clone(),
            )),
            DirectionPolicy::Compass(compass) => Some(Headsign::new(
                direction,
                compass[usize::from(direction)].label(),
            )),
            DirectionPolicy::DefaultClean => Some(Headsign::new(
                direction,
                names::clean_trip_headsign(trip.headsign_or_empty()),
            )),
        };
        Ok(headsign)
    }

    /// Two trips of the same route and direction ended up with different labels; pick the one to
    /// show for both.
    pub fn merge_headsign(
        &self,
        route: &RouteID,
        first: &AssignedTrip,
        second: &AssignedTrip,
    ) -> Result<String, AgencyError> {
        let (label1, label2) = (&first.headsign.label, &second.headsign.label);
        if label1.is_empty() || label1 == label2 {
            return Ok(label2.clone());
        }
        if label2.is_empty() {
            return Ok(label1.clone());
        }

        let number = *self
            .route_numbers
            .get(route)
            .ok_or_else(|| AgencyError::BadRouteNumber {
                route: route.to_string(),
            })?;
        if let Some(rule) = self
            .config
            .merge_rules
            .get(&number)
            .and_then(|rules| rules.iter().find(|rule| rule.accepts(label1, label2)))
        {
            return Ok(rule.merged.clone());
        }

        if self.config.good_enough {
            let merged = default_merge(label1, label2);
            warn!("Route {number}: no rule for {label1:?} & {label2:?}, using {merged:?}");
            return Ok(merged);
        }
        Err(AgencyError::UnmappedMerge {
            route: number,
            first_trip: first.trip_id.to_string(),
            first_label: label1.clone(),
            second_trip: second.trip_id.to_string(),
            second_label: label2.clone(),
        })
    }

    /// For routes split by anchor stops, decides the direction of a whole trip.
    pub fn split_direction(
        &self,
        route_number: u32,
        trip: &Trip,
        gtfs: &GTFS,
    ) -> Result<Option<Headsign>, AgencyError> {
        let spec = match self.config.split_spec(route_number) {
            Some(spec) => spec,
            None => return Ok(None),
        };
        let stop_codes: Vec<&str> = gtfs.stops_of(trip).map(|stop| stop.code_or_id()).collect();
        let direction = match spec.assign_direction(&stop_codes, trip.direction_id) {
            Some(direction) => direction,
            None if self.config.good_enough => {
                warn!(
                    "Route {route_number}: can't tell the direction of {}, assuming 0",
                    trip.trip_id
                );
                0
            }
            None => {
                return Err(AgencyError::UnsplittableTrip {
                    route: route_number,
                    trip: trip.trip_id.to_string(),
                })
            }
        };
        Ok(Some(Headsign::new(direction, spec.label(direction))))
    }

    /// Stop codes of two stops on a split route. None unless both are anchors of the direction.
    pub fn compare_early(
        &self,
        route_number: u32,
        direction: u8,
        stop1: &str,
        stop2: &str,
    ) -> Option<Ordering> {
        self.config
            .split_spec(route_number)?
            .compare_early(direction, stop1, stop2)
    }

    /// Stop codes double as the numeric stop ID
    pub fn stop_id(&self, stop: &Stop) -> Result<u32, AgencyError> {
        stop.code_or_id()
            .trim()
            .parse::<u32>()
            .map_err(|_| AgencyError::BadStopCode {
                stop: stop.stop_id.to_string(),
            })
    }

    pub fn clean_stop_name(&self, stop: &Stop) -> String {
        names::clean_stop_name(stop.name.as_deref().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use gtfs::{AgencyID, RouteType, StopID, TripID};

    use super::*;
    use crate::{Compass, MergeRule};

    fn route(route_id: &str, agency_id: Option<&str>, short_name: Option<&str>) -> Route {
        Route {
            route_id: RouteID::new(route_id),
            agency_id: agency_id.map(AgencyID::new),
            route_type: RouteType::Bus,
            short_name: short_name.map(|x| x.to_string()),
            long_name: None,
            description: None,
            color: None,
            text_color: None,
        }
    }

    fn trip(trip_id: &str, headsign: &str, direction_id: Option<u8>) -> Trip {
        Trip {
            trip_id: TripID::new(trip_id),
            route_id: RouteID::new("7-NAN"),
            service_id: ServiceID::new("WK"),
            headsign: Some(headsign.to_string()),
            direction_id,
            stop_times: Vec::new(),
        }
    }

    fn assigned(trip_id: &str, direction: u8, label: &str) -> AssignedTrip {
        AssignedTrip {
            trip_id: TripID::new(trip_id),
            headsign: Headsign::new(direction, label),
        }
    }

    #[test]
    fn foreign_agencies_are_excluded() {
        let tools = RdnTransitTools::new(AgencyConfig::rdn());
        assert!(!tools.exclude_route(&route("40-NAN", Some("1"), Some("40"))));
        assert!(tools.exclude_route(&route("70-COW", Some("2"), Some("70"))));
        assert!(tools.exclude_route(&route("70-COW", None, Some("70"))));
    }

    #[test]
    fn route_numbers() {
        let tools = RdnTransitTools::new(AgencyConfig::rdn());
        assert_eq!(tools.route_id(&route("x", Some("1"), Some("40"))), Ok(40));
        assert_eq!(tools.route_id(&route("15-NAN", Some("1"), None)), Ok(15));
        assert_eq!(tools.route_id(&route("15-NAN", Some("1"), Some("15A"))), Ok(15));
        assert_eq!(
            tools.route_id(&route("VIU-NAN", Some("1"), Some("VIU"))),
            Err(AgencyError::BadRouteNumber {
                route: "VIU-NAN".to_string()
            })
        );
    }

    #[test]
    fn route_colors() {
        let mut config = AgencyConfig::rdn();
        let tools = RdnTransitTools::new(config.clone());
        assert_eq!(
            tools.route_color(&route("40-NAN", Some("1"), Some("40"))),
            Ok("009FC2".to_string())
        );

        let mut colored = route("40-NAN", Some("1"), Some("40"));
        colored.color = Some("FF0000".to_string());
        assert_eq!(tools.route_color(&colored), Ok("FF0000".to_string()));

        let unknown = route("70-NAN", Some("1"), Some("70"));
        assert_eq!(
            tools.route_color(&unknown),
            Err(AgencyError::UnknownRouteColor {
                route: "70-NAN".to_string(),
                number: 70
            })
        );

        config.good_enough = true;
        let tools = RdnTransitTools::new(config);
        assert_eq!(tools.route_color(&unknown), Ok("002C77".to_string()));
        assert_eq!(tools.agency_color(), "34B233");
    }

    #[test]
    fn default_headsigns_follow_the_feed_direction() {
        let mut tools = RdnTransitTools::new(AgencyConfig::rdn());
        let route7 = route("7-NAN", Some("1"), Some("7"));
        assert_eq!(
            tools
                .set_trip_headsign(&route7, &trip("t1", "7 CINNIBAR AND CEDAR", Some(1)))
                .unwrap(),
            Some(Headsign::new(1, "Cinnabar & Cedar"))
        );
        assert_eq!(
            tools
                .set_trip_headsign(&route7, &trip("t2", "7 Downtown", None))
                .unwrap(),
            Some(Headsign::new(0, "Downtown"))
        );

        // Split routes get their label elsewhere
        let route11 = route("11-NAN", Some("1"), Some("11"));
        assert_eq!(
            tools
                .set_trip_headsign(&route11, &trip("t3", "11 Lantzville", Some(0)))
                .unwrap(),
            None
        );
    }

    #[test]
    fn static_and_compass_policies() {
        let mut config = AgencyConfig::rdn();
        config.policies.insert(
            30,
            DirectionPolicy::StaticLabels(["Inbound".to_string(), "Outbound".to_string()]),
        );
        config.policies.insert(
            50,
            DirectionPolicy::Compass([Compass::North, Compass::South]),
        );
        let mut tools = RdnTransitTools::new(config);
        assert_eq!(
            tools
                .set_trip_headsign(&route("30", Some("1"), Some("30")), &trip("t1", "x", Some(1)))
                .unwrap(),
            Some(Headsign::new(1, "Outbound"))
        );
        assert_eq!(
            tools
                .set_trip_headsign(&route("50", Some("1"), Some("50")), &trip("t2", "x", None))
                .unwrap(),
            Some(Headsign::new(0, "North"))
        );
    }

    #[test]
    fn merges() {
        let mut tools = RdnTransitTools::new(AgencyConfig::rdn());
        let route7 = route("7-NAN", Some("1"), Some("7"));
        tools
            .set_trip_headsign(&route7, &trip("t1", "Downtown", Some(0)))
            .unwrap();

        let downtown = assigned("t1", 0, "Downtown");
        let cinnabar = assigned("t2", 0, "Cinnabar");
        assert_eq!(
            tools.merge_headsign(&route7.route_id, &downtown, &cinnabar),
            Ok("Cinnabar & Cedar".to_string())
        );
        assert_eq!(
            tools.merge_headsign(&route7.route_id, &cinnabar, &downtown),
            Ok("Cinnabar & Cedar".to_string())
        );
        assert_eq!(
            tools.merge_headsign(&route7.route_id, &assigned("t3", 0, ""), &cinnabar),
            Ok("Cinnabar".to_string())
        );

        let harewood = assigned("t4", 0, "Harewood");
        assert_eq!(
            tools.merge_headsign(&route7.route_id, &downtown, &harewood),
            Err(AgencyError::UnmappedMerge {
                route: 7,
                first_trip: "t1".to_string(),
                first_label: "Downtown".to_string(),
                second_trip: "t4".to_string(),
                second_label: "Harewood".to_string(),
            })
        );
    }

    fn tools_knowing_routes(numbers: &[u32]) -> RdnTransitTools {
        let mut tools = RdnTransitTools::new(AgencyConfig::rdn());
        for number in numbers {
            let route = route(&format!("{number}-NAN"), Some("1"), Some(&number.to_string()));
            tools
                .set_trip_headsign(&route, &trip("t0", "Downtown", Some(0)))
                .unwrap();
        }
        tools
    }

    #[test]
    fn every_merge_rule_pair() {
        let table: &[(u32, &str, &str, &str)] = &[
            (5, "Westwood", "Downtown", "Downtown"),
            (6, "Country Club", "Downtown", "Downtown"),
            (7, "Downtown", "Cinnabar", "Cinnabar & Cedar"),
            (7, "Downtown", "Cinnabar & Cedar", "Cinnabar & Cedar"),
            (7, "Cinnabar", "Cinnabar & Cedar", "Cinnabar & Cedar"),
            (11, "BC Ferries", "Lantzville", "Lantzville"),
            (15, "A VIU", "VIU Only", "VIU"),
            (15, "A VIU", "VIU-", "VIU"),
            (15, "A VIU", "VIU", "VIU"),
            (15, "VIU Only", "VIU-", "VIU"),
            (15, "VIU Only", "VIU", "VIU"),
            (15, "VIU-", "VIU", "VIU"),
            (15, "A Woodgrove", "Woodgrove", "Woodgrove"),
            (20, "Country Club", "Downtown", "Downtown"),
            (20, "Country Club", "Woodgrove", "Woodgrove"),
            (20, "Downtown", "Woodgrove", "Woodgrove"),
            (25, "Woodgrove", "BC Ferries", "BC Ferries"),
            (40, "School Special", "Woodgrove", "Woodgrove"),
            (40, "VIU Only", "Downtown", "Downtown"),
            (91, "BC Ferries", "Woodgrove", "Woodgrove"),
            (99, "Duke Pt", "Qualicum Beach", "Qualicum Beach"),
        ];
        let tools = tools_knowing_routes(&[5, 6, 7, 11, 15, 20, 25, 40, 91, 99]);
        for (number, label1, label2, merged) in table {
            let route_id = RouteID::new(format!("{number}-NAN"));
            let (first, second) = (assigned("t1", 0, label1), assigned("t2", 0, label2));
            assert_eq!(
                tools.merge_headsign(&route_id, &first, &second).as_deref(),
                Ok(*merged),
                "route {number}: {label1:?} & {label2:?}"
            );
            assert_eq!(
                tools.merge_headsign(&route_id, &second, &first).as_deref(),
                Ok(*merged),
                "route {number}: {label2:?} & {label1:?}"
            );
        }

        // Rules don't leak across routes or between a route's own rules
        let route15 = RouteID::new("15-NAN");
        assert!(tools
            .merge_headsign(&route15, &assigned("t1", 0, "VIU"), &assigned("t2", 0, "Woodgrove"))
            .is_err());
        let route5 = RouteID::new("5-NAN");
        assert!(tools
            .merge_headsign(&route5, &assigned("t1", 0, "Country Club"), &assigned("t2", 0, "Downtown"))
            .is_err());
    }

    // Labels get folded pairwise, so every arrival order has to land on the same label
    #[test]
    fn route_20_folds_to_woodgrove() {
        let tools = tools_knowing_routes(&[20]);
        let route20 = RouteID::new("20-NAN");
        let orders = [
            ["Downtown", "Country Club", "Woodgrove"],
            ["Downtown", "Woodgrove", "Country Club"],
            ["Country Club", "Downtown", "Woodgrove"],
            ["Country Club", "Woodgrove", "Downtown"],
            ["Woodgrove", "Downtown", "Country Club"],
            ["Woodgrove", "Country Club", "Downtown"],
        ];
        for order in orders {
            let mut current = assigned("a", 0, order[0]);
            for (idx, label) in order.iter().enumerate().skip(1) {
                let next = assigned(&format!("t{idx}"), 0, label);
                current.headsign.label = tools.merge_headsign(&route20, &current, &next).unwrap();
            }
            assert_eq!(current.headsign.label, "Woodgrove", "{order:?}");
        }
    }

    #[test]
    fn good_enough_merges() {
        let mut config = AgencyConfig::rdn();
        config.good_enough = true;
        config
            .merge_rules
            .insert(30, vec![MergeRule::new(&["A", "B"], "B")]);
        let mut tools = RdnTransitTools::new(config);
        let route30 = route("30-NAN", Some("1"), Some("30"));
        tools
            .set_trip_headsign(&route30, &trip("t1", "Downtown", Some(0)))
            .unwrap();
        assert_eq!(
            tools.merge_headsign(
                &route30.route_id,
                &assigned("t1", 0, "Downtown"),
                &assigned("t2", 0, "Harewood")
            ),
            Ok("Downtown / Harewood".to_string())
        );
        assert_eq!(
            tools.merge_headsign(
                &route30.route_id,
                &assigned("t1", 0, "A"),
                &assigned("t2", 0, "B")
            ),
            Ok("B".to_string())
        );
    }

    #[test]
    fn stops() {
        let tools = RdnTransitTools::new(AgencyConfig::rdn());
        let mut stop = Stop {
            stop_id: StopID::new("1234"),
            code: Some("110226".to_string()),
            name: Some("Eastwind at Northwind".to_string()),
            lat: 49.23,
            lon: -124.05,
        };
        assert_eq!(tools.stop_id(&stop), Ok(110226));
        assert_eq!(tools.clean_stop_name(&stop), "Eastwind / Northwind");

        stop.code = None;
        assert_eq!(tools.stop_id(&stop), Ok(1234));
        stop.stop_id = StopID::new("NAN-X");
        assert_eq!(
            tools.stop_id(&stop),
            Err(AgencyError::BadStopCode {
                stop: "NAN-X".to_string()
            })
        );
    }
}
