use crate::cli::GustScenarioCli;
use clap::Parser;

/// Initialise logging and the CLI for a Gust scenario.
pub fn init() -> GustScenarioCli {
    env_logger::init();

    GustScenarioCli::parse()
}
