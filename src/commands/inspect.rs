//! One-shot inspection.

use crate::core::Inspector;
use crate::platform::ExecutionContext;

use super::logic::{render, OutputFormat};

pub fn run_inspect(ctx: &dyn ExecutionContext, format: OutputFormat) -> anyhow::Result<()> {
    let inspector = Inspector::for_context(ctx);
    tracing::debug!(capabilities = ?inspector.capabilities(), "Inspector bound");
    let report = inspector.inspect(ctx);
    tracing::info!(
        vpn_active = report.vpn_active,
        techniques = report.techniques.len(),
        "Inspection complete"
    );
    print!("{}", render(&report, format)?);
    if format != OutputFormat::Text {
        println!();
    }
    Ok(())
}
