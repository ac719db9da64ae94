use clap::Parser;
use std::time::Duration;

#[derive(Clone, Debug, Parser)]
#[command(version, about = "Serves the train timetable and statistics views")]
pub struct Config {
    /// Base URL of the trains API
    #[arg(long, env = "API_ENDPOINT")]
    pub api_endpoint: String,

    /// Port the HTTP server listens on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds between two polls of the trains API
    #[arg(
        long,
        env = "POLL_INTERVAL",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval: u64,
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }
}
