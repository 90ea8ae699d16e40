//! Host-triggered proxy automation: peak-window node scheduling and network
//! identity diagnostics

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use routepilot_core::{
    run_diagnostics, run_schedule, ApiHost, ConfigLoader, HostConfig, HostRuntime, PanelResult,
    ReqwestFetch,
};
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "routepilot")]
#[command(about = "Peak-window policy scheduling and identity diagnostics for proxy clients")]
struct Args {
    /// Config file path
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-evaluate the peak window and select the matching node
    Schedule,
    /// Query the identity providers and print the network identity report
    Diag {
        /// Pin provider queries through this named routing policy
        #[arg(long)]
        policy: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let env_filter = if args.verbose {
        EnvFilter::from_default_env()
            .add_directive(tracing_subscriber::filter::LevelFilter::DEBUG.into())
    } else {
        EnvFilter::from_default_env()
            .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration; a malformed config is the one fatal condition,
    // surfaced as an error-styled panel
    let config = match ConfigLoader::load_or_default(args.config) {
        Ok(config) => config,
        Err(e) => {
            let host = ApiHost::new(&HostConfig::default());
            host.complete(PanelResult::error("Configuration error", &e.to_string()));
            return Err(e.into());
        }
    };

    let host = ApiHost::new(&config.host);

    match args.command {
        Command::Schedule => {
            let decision = run_schedule(&host, &config.schedule, Local::now()).await;
            tracing::info!(
                group = %decision.group,
                node = %decision.node,
                reason = ?decision.reason,
                "schedule run complete"
            );
        }
        Command::Diag { policy } => {
            let fetch = ReqwestFetch::new(config.diagnostics.routes.clone());
            if let Err(e) =
                run_diagnostics(&host, &fetch, &config.diagnostics, policy.as_deref()).await
            {
                host.complete(PanelResult::error("Diagnostics error", &e.to_string()));
                return Err(e.into());
            }
        }
    }

    Ok(())
}
