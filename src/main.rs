use anyhow::Result;
use careeros::app_log;
use careeros::cli::{handle_command, Cli};
use careeros::core::AppConfig;
use careeros::logging;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    logging::init(config.logging.file.as_deref(), config.logging.json)?;

    app_log!(info, "CareerOS {}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &cli.config {
        app_log!(info, "Config file: {}", path.display());
    }
    for warning in config.take_warnings() {
        app_log!(warn, "{}", warning);
    }

    handle_command(cli.command, config).await
}
