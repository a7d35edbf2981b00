#[macro_use]
extern crate log;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = importer::start(std::env::args().skip(1).collect()) {
        error!("{err:#}");
        std::process::exit(1);
    }
}
