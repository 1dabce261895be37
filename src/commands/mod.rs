//! Command handlers for the CLI, one per subcommand.
//!
//! - `inspect`: one-shot report
//! - `watch`: live re-inspection until interrupted
//! - `logic`: pure rendering and validation (unit-testable)

pub(crate) mod inspect;
pub(crate) mod logic;
pub(crate) mod watch;

pub use logic::OutputFormat;
