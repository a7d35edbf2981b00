use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::import::Normalized;

/// Writes every output file into `dir`, each name starting with `prefix`.
pub fn write_all(normalized: &Normalized, dir: &Path, prefix: &str) -> Result<()> {
    fs_err::create_dir_all(dir)?;
    let path = |name: &str| dir.join(format!("{prefix}{name}"));

    write_rows(
        &path("routes.txt"),
        normalized.routes.values().map(|route| RouteRow {
            route_id: route.id,
            route_short_name: &route.short_name,
            route_long_name: &route.long_name,
            route_color: &route.color,
        }),
    )?;

    write_rows(
        &path("trips.txt"),
        normalized.directions.values().map(|direction| TripRow {
            route_id: direction.route,
            direction_id: direction.direction,
            trip_headsign: &direction.headsign,
            direction_kind: direction.kind.map(|kind| kind.as_str()),
            trips: direction.trips.len(),
        }),
    )?;

    write_rows(
        &path("trip_stops.txt"),
        normalized.directions.values().flat_map(|direction| {
            direction
                .stops
                .iter()
                .enumerate()
                .map(move |(idx, stop)| TripStopRow {
                    route_id: direction.route,
                    direction_id: direction.direction,
                    stop_id: *stop,
                    stop_sequence: idx + 1,
                })
        }),
    )?;

    write_rows(
        &path("stops.txt"),
        normalized.stops.values().map(|stop| StopRow {
            stop_id: stop.id,
            stop_code: &stop.code,
            stop_name: &stop.name,
            stop_lat: stop.lat,
            stop_lon: stop.lon,
        }),
    )?;

    write_rows(
        &path("calendar.txt"),
        normalized.services.iter().filter_map(|service| {
            let weekly = service.weekly.as_ref()?;
            let days = &weekly.days_of_week;
            Some(CalendarRow {
                service_id: service.service_id.as_str(),
                monday: days.monday.into(),
                tuesday: days.tuesday.into(),
                wednesday: days.wednesday.into(),
                thursday: days.thursday.into(),
                friday: days.friday.into(),
                saturday: days.saturday.into(),
                sunday: days.sunday.into(),
                start_date: weekly.start_date.format(DATE_FORMAT).to_string(),
                end_date: weekly.end_date.format(DATE_FORMAT).to_string(),
            })
        }),
    )?;

    write_rows(
        &path("calendar_dates.txt"),
        normalized.services.iter().flat_map(|service| {
            let added = service.extra_days.iter().map(|day| (day, 1));
            let removed = service.removed_days.iter().map(|day| (day, 2));
            added
                .chain(removed)
                .map(move |(day, exception_type)| CalendarDateRow {
                    service_id: service.service_id.as_str(),
                    date: day.format(DATE_FORMAT).to_string(),
                    exception_type,
                })
        }),
    )?;

    Ok(())
}

const DATE_FORMAT: &str = "%Y%m%d";

fn write_rows<T: Serialize, I: Iterator<Item = T>>(path: &Path, rows: I) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(fs_err::File::create(path)?);
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;
    debug!("Wrote {count} rows to {}", path.display());
    Ok(count)
}

#[derive(Serialize)]
struct RouteRow<'a> {
    route_id: u32,
    route_short_name: &'a str,
    route_long_name: &'a str,
    route_color: &'a str,
}

#[derive(Serialize)]
struct TripRow<'a> {
    route_id: u32,
    direction_id: u8,
    trip_headsign: &'a str,
    direction_kind: Option<&'static str>,
    trips: usize,
}

#[derive(Serialize)]
struct TripStopRow {
    route_id: u32,
    direction_id: u8,
    stop_id: u32,
    stop_sequence: usize,
}

#[derive(Serialize)]
struct StopRow<'a> {
    stop_id: u32,
    stop_code: &'a str,
    stop_name: &'a str,
    stop_lat: f64,
    stop_lon: f64,
}

#[derive(Serialize)]
struct CalendarRow<'a> {
    service_id: &'a str,
    monday: u8,
    tuesday: u8,
    wednesday: u8,
    thursday: u8,
    friday: u8,
    saturday: u8,
    sunday: u8,
    start_date: String,
    end_date: String,
}

#[derive(Serialize)]
struct CalendarDateRow<'a> {
    service_id: &'a str,
    date: String,
    exception_type: u8,
}
