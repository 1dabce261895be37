//! Live re-inspection on a background tokio task.
//!
//! [`ConnectivityWatch`] owns the task. Reports are published on a
//! `tokio::sync::watch` channel only when they differ from the previous one.
//! Dropping the handle stops the task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::inspector::Inspector;
use crate::core::report::Report;
use crate::platform::ExecutionContext;

/// Subscription to changing inspection results.
pub struct ConnectivityWatch {
    task: Option<JoinHandle<()>>,
    reports: watch::Receiver<Report>,
}

impl ConnectivityWatch {
    /// Inspect `ctx` now, then again every `interval`. Must be called from
    /// within a tokio runtime.
    pub fn start<C>(ctx: Arc<C>, interval: Duration) -> Self
    where
        C: ExecutionContext + Send + Sync + 'static,
    {
        let inspector = Inspector::for_context(&*ctx);
        let (tx, rx) = watch::channel(inspector.inspect(&*ctx));
        let period = interval.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the initial report is already published.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let report = inspector.inspect(&*ctx);
                let changed = tx.send_if_modified(|current| {
                    if *current == report {
                        false
                    } else {
                        *current = report;
                        true
                    }
                });
                if changed {
                    tracing::debug!("Connectivity report changed");
                }
                if tx.is_closed() {
                    break;
                }
            }
        });

        tracing::info!("Connectivity watch started ({period:?} interval)");
        Self {
            task: Some(task),
            reports: rx,
        }
    }

    /// A new receiver positioned at the latest report.
    pub fn subscribe(&self) -> watch::Receiver<Report> {
        self.reports.clone()
    }

    /// The most recently published report.
    pub fn latest(&self) -> Report {
        self.reports.borrow().clone()
    }

    /// Wait for the next changed report. `None` once the watch has stopped.
    pub async fn changed(&mut self) -> Option<Report> {
        self.reports.changed().await.ok()?;
        Some(self.reports.borrow_and_update().clone())
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the background task. Idempotent.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!("Connectivity watch stopped");
        }
    }
}

impl Drop for ConnectivityWatch {
    fn drop(&mut self) {
        self.stop();
    }
}
