//! Live mode: print the report, then every changed report until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use crate::core::{ConnectivityWatch, Report};
use crate::platform::ExecutionContext;

use super::logic::{render, watch_exhausted, OutputFormat};

pub async fn run_watch<C>(
    ctx: Arc<C>,
    interval: Duration,
    count: Option<u64>,
    format: OutputFormat,
) -> anyhow::Result<()>
where
    C: ExecutionContext + Send + Sync + 'static,
{
    let mut watch = ConnectivityWatch::start(ctx, interval);
    let mut printed = 0u64;

    print_report(&watch.latest(), format)?;
    printed += 1;

    while !watch_exhausted(printed, count) {
        tokio::select! {
            next = watch.changed() => match next {
                Some(report) => {
                    print_report(&report, format)?;
                    printed += 1;
                }
                None => {
                    tracing::warn!("Connectivity watch ended unexpectedly");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted; stopping watch");
                break;
            }
        }
    }

    watch.stop();
    Ok(())
}

/// Text reports end with a newline, so `println!` leaves a blank separator line.
fn print_report(report: &Report, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render(report, format)?);
    Ok(())
}
