use alumni_sync::cli::{parse_args, run_cli_command};
use alumni_sync::config::SyncConfig;

use color_eyre::Result;
use tracing_subscriber::EnvFilter;

/// Default log filter when RUST_LOG is unset.
const DEFAULT_LOG_FILTER: &str = "alumni_sync=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Logs go to stderr so command output stays clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let args = parse_args(std::env::args());
    let config = SyncConfig::from_env();

    tracing::debug!(
        "api={} feed={} media={}",
        config.api_url,
        config.feed_url,
        config.media_base()
    );

    run_cli_command(args, config)
}
