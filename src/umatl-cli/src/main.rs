mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "umatl=debug,umatl_meta=debug"
    } else {
        "umatl=warn,umatl_meta=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract(args) => {
            let config = Config::load()?;
            commands::extract::handle(&args, &config)?;
        }

        Commands::Configure {
            asset_root,
            meta,
            export_root,
            show,
        } => {
            commands::configure::handle(asset_root, meta, export_root, show)?;
        }
    }

    Ok(())
}
