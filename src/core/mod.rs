//! Core logic: the inspector and its report.
//!
//! - [`Inspector`] — runs every technique and builds a [`Report`]
//! - [`probe`] — transport-flag and legacy network probes
//! - [`report`] — report and per-technique outcomes
//! - [`watch`] — re-inspects on an interval and publishes changes

pub mod inspector;
pub mod probe;
pub mod report;
pub mod trace;
pub mod watch;

pub use inspector::{inspect, Inspector};
pub use report::{Report, Technique, TechniqueOutcome, TechniqueResult};
pub use watch::ConnectivityWatch;
