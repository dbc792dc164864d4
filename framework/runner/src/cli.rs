use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(about, long_about = None)]
pub struct GustScenarioCli {
    /// Base URL of the service under test, e.g. `http://localhost:8000`
    #[clap(short, long)]
    pub target: String,

    /// The number of virtual users to run.
    ///
    /// Only used when the scenario does not configure a load shape. A shaped scenario decides
    /// its own population over time and ignores this flag.
    #[clap(short, long)]
    pub users: Option<usize>,

    /// Users started per second while ramping up to the requested user count.
    ///
    /// Only used when the scenario does not configure a load shape.
    #[clap(long)]
    pub spawn_rate: Option<usize>,

    /// The number of seconds to run the scenario for
    #[clap(long)]
    pub duration: Option<u64>,

    /// Run this scenario as a soak test, ignoring any configured duration and continuing to run
    /// until stopped
    #[clap(long, default_value = "false")]
    pub soak: bool,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar is just adding noise
    /// to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,
}
