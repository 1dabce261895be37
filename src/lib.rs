mod cli;
mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod platform;

use std::sync::Arc;

use clap::Parser;

pub use crate::core::{inspect, ConnectivityWatch, Inspector, Report, Technique, TechniqueOutcome};
pub use crate::error::AppError;

use cli::{Cli, Commands};
use commands::OutputFormat;
use platform::host::{HostContext, HostPaths};

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("PANIC in vpn-inspector: {info}");
        default_hook(info);
    }));

    let default_filter = if cli.verbose {
        config::VERBOSE_LOG_FILTER
    } else {
        config::DEFAULT_LOG_FILTER
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let ctx = HostContext::with_paths(HostPaths::new(&cli.host_root));

    match cli.command() {
        Commands::Inspect => {
            let format = if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            };
            commands::inspect::run_inspect(&ctx, format)
        }
        Commands::Watch { interval_ms, count } => {
            let interval = commands::logic::validate_interval(interval_ms)?;
            let format = if cli.json {
                OutputFormat::JsonLines
            } else {
                OutputFormat::Text
            };
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(commands::watch::run_watch(
                Arc::new(ctx),
                interval,
                count,
                format,
            ))
        }
    }
}
