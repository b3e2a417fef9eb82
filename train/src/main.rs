use anyhow::{Context, Result};
use std::{env, path::PathBuf, sync::Arc};
use structopt::StructOpt;
use train::config::Config;
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};

#[derive(Debug, Clone, StructOpt)]
/// Train the aircraft multi-task detector
struct Args {
    #[structopt(long)]
    /// configuration file; defaults reproduce the original experiment
    pub config_file: Option<PathBuf>,
}

#[tokio::main]
pub async fn main() -> Result<()> {
    // setup tracing
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).compact();
    let filter_layer = {
        let filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            filter.add_directive(LevelFilter::INFO.into())
        } else {
            filter
        }
    };
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    // parse arguments
    let Args { config_file } = Args::from_args();
    let config = match &config_file {
        Some(file) => Config::open(file)
            .with_context(|| format!("failed to load config file '{}'", file.display()))?,
        None => Config::default(),
    };

    // start training program
    train::start(Arc::new(config)).await?;

    Ok(())
}
