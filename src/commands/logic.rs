//! Pure rendering and validation used by the command handlers.
//!
//! These functions take plain parameters (no host access) and can be
//! unit-tested without touching the machine.

use std::time::Duration;

use crate::config;
use crate::core::Report;
use crate::error::AppError;

/// How reports are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    /// Pretty JSON for one-shot output.
    Json,
    /// One compact JSON object per line, for streams.
    JsonLines,
}

pub fn status_line(report: &Report) -> &'static str {
    if report.vpn_active {
        "VPN: ACTIVE"
    } else {
        "VPN: NOT ACTIVE"
    }
}

/// Status line, technique labels, then the trace log.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(status_line(report));
    out.push_str("\n\nTechniques:\n");
    if report.techniques.is_empty() {
        out.push_str("  (none)\n");
    }
    for technique in &report.techniques {
        out.push_str(&format!("  [{technique}]\n"));
    }
    out.push_str("\n=== Trace Info ===\n");
    for detail in &report.details {
        out.push_str(&format!("\u{2022} {detail}\n"));
    }
    out
}

pub fn render(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::JsonLines => serde_json::to_string(report)?,
    })
}

/// Reject watch intervals below the supported minimum.
pub fn validate_interval(interval_ms: u64) -> Result<Duration, AppError> {
    if interval_ms < config::MIN_WATCH_INTERVAL_MS {
        return Err(AppError::InvalidInput(format!(
            "watch interval must be at least {} ms (got {interval_ms})",
            config::MIN_WATCH_INTERVAL_MS
        )));
    }
    Ok(Duration::from_millis(interval_ms))
}

/// Whether a watch that has printed `printed` reports should stop.
pub fn watch_exhausted(printed: u64, count: Option<u64>) -> bool {
    count.is_some_and(|limit| printed >= limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::FakeContext;
    use crate::platform::InterfaceInfo;

    fn active_report() -> Report {
        crate::inspect(&FakeContext::new().with_interfaces(vec![InterfaceInfo {
            name: "tun0".into(),
            up: true,
        }]))
    }

    #[test]
    fn test_render_text_active() {
        let text = render_text(&active_report());
        assert!(text.starts_with("VPN: ACTIVE\n"));
        assert!(text.contains("  [Heuristic: tun* interface UP]\n"));
        assert!(text.contains("=== Trace Info ===\n\u{2022} Active network: none (no connectivity?)\n"));
        assert!(text.contains("\u{2022} Interface check: tun0 up=true\n"));
    }

    #[test]
    fn test_render_text_without_techniques() {
        let report = Report::connectivity_unavailable();
        let text = render_text(&report);
        assert!(text.starts_with("VPN: NOT ACTIVE\n"));
        assert!(text.contains("  (none)\n"));
        assert!(text.ends_with("\u{2022} Connectivity service: unavailable\n"));
    }

    #[test]
    fn test_render_json_lines_is_single_line() {
        let line = render(&active_report(), OutputFormat::JsonLines).unwrap();
        assert!(!line.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["vpnActive"], true);
    }

    #[test]
    fn test_render_json_pretty() {
        let json = render(&Report::connectivity_unavailable(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["techniques"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_validate_interval() {
        assert_eq!(validate_interval(2000).unwrap(), Duration::from_secs(2));
        assert_eq!(
            validate_interval(config::MIN_WATCH_INTERVAL_MS - 1)
                .unwrap_err()
                .kind(),
            "InvalidInput"
        );
    }

    #[test]
    fn test_watch_exhausted() {
        assert!(!watch_exhausted(10, None));
        assert!(!watch_exhausted(1, Some(2)));
        assert!(watch_exhausted(2, Some(2)));
    }
}
