#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod import;
mod output;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use chrono::NaiveDate;
use structopt::clap::ErrorKind;
use structopt::StructOpt;

use agency::{AgencyConfig, RdnTransitTools};
use gtfs::GTFS;

pub use self::import::{import, Direction, Normalized, NormalizedRoute, NormalizedStop};
pub use self::output::write_all;

#[derive(StructOpt)]
#[structopt(about = "Normalizes the RDN Transit System GTFS feed")]
pub struct Args {
    /// A GTFS .zip archive, or a directory of .txt files
    #[structopt(default_value = "input/gtfs.zip")]
    input: String,
    /// Where the normalized files go
    #[structopt(default_value = "../../mtransitapps/ca-nanaimo-rdn-transit-system-bus-android/res/raw/")]
    output_dir: String,
    /// Prepended to every output file name
    prefix: Option<String>,

    /// Use fallback colors and labels for routes the tables don't cover yet, instead of failing
    #[structopt(long)]
    good_enough: bool,
    /// Routes of any other agency in the feed are skipped
    #[structopt(long, default_value = "1")]
    agency_id: String,
    /// Only keep services whose ID contains this
    #[structopt(long)]
    service_token: Option<String>,
    /// Drop services that end before this day, as YYYYMMDD
    #[structopt(long, parse(try_from_str = gtfs::parse_date))]
    run_date: Option<NaiveDate>,
}

impl Args {
    fn config(&self) -> AgencyConfig {
        let mut config = AgencyConfig::rdn();
        config.agency_id = self.agency_id.clone();
        config.service_id_token = self.service_token.clone();
        config.run_date = self.run_date;
        config.good_enough = self.good_enough;
        config
    }
}

/// What one run produced
#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub routes: usize,
    pub directions: usize,
    pub trips: usize,
    pub stops: usize,
    pub services: usize,
    /// True if no service was useful, so nothing but empty files got written
    pub excluded_all: bool,
}

impl Summary {
    fn new(normalized: &Normalized) -> Self {
        Self {
            routes: normalized.routes.len(),
            directions: normalized.directions.len(),
            trips: normalized
                .directions
                .values()
                .map(|direction| direction.trips.len())
                .sum(),
            stops: normalized.stops.len(),
            services: normalized.services.len(),
            excluded_all: normalized.directions.is_empty(),
        }
    }
}

/// Runs the whole import. `args` are the command-line arguments, without the program name.
pub fn start(args: Vec<String>) -> Result<Summary> {
    let args = match Args::from_iter_safe(std::iter::once("importer".to_string()).chain(args)) {
        Ok(args) => args,
        Err(err) if matches!(err.kind, ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed) => {
            println!("{}", err.message);
            return Ok(Summary::default());
        }
        Err(err) => bail!("{}", err.message),
    };

    let started = Instant::now();
    let gtfs = GTFS::load(&args.input)?;
    let mut tools = RdnTransitTools::new(args.config());
    let normalized = import(&gtfs, &mut tools)?;
    write_all(
        &normalized,
        Path::new(&args.output_dir),
        args.prefix.as_deref().unwrap_or(""),
    )?;

    let summary = Summary::new(&normalized);
    info!(
        "Wrote {} routes ({} directions, {} trips), {} stops, {} services to {} in {:?}. Agency color {}",
        summary.routes,
        summary.directions,
        summary.trips,
        summary.stops,
        summary.services,
        args.output_dir,
        started.elapsed(),
        tools.agency_color()
    );
    Ok(summary)
}
