use clap::Parser;
use log::info;

use multibrot::config::{self, Cli};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::load(&cli)?;

    env_logger::Builder::from_default_env()
        .filter_level(config.log_level.to_filter())
        .init();

    info!(
        "explorer {} starting at {}x{}",
        env!("CARGO_PKG_VERSION"),
        config.width,
        config.height
    );

    multibrot::run_explorer(&config)?;

    Ok(())
}
