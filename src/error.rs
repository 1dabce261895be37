//! Unified error type for platform collaborators.
//!
//! `AppError` is returned by every fallible platform query. The inspector never
//! lets one escape: each is turned into a trace line or an `Unavailable`
//! technique outcome. It serializes as `{ "kind": "...", "message": "..." }`
//! so JSON consumers can distinguish error categories.

use serde::ser::SerializeStruct;

/// Error raised by a platform collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    /// The connectivity source failed to answer a query.
    #[error("{0}")]
    Platform(String),

    /// Network interface enumeration failed.
    #[error("{0}")]
    Interfaces(String),

    /// A global setting could not be read.
    #[error("{0}")]
    Settings(String),

    /// Filesystem-level errors reading host state.
    #[error("{0}")]
    Io(String),

    /// Invalid or missing user input.
    #[error("{0}")]
    InvalidInput(String),
}

impl AppError {
    /// Returns the error kind as a string matching the variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Platform(_) => "Platform",
            AppError::Interfaces(_) => "Interfaces",
            AppError::Settings(_) => "Settings",
            AppError::Io(_) => "Io",
            AppError::InvalidInput(_) => "InvalidInput",
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("AppError", 2)?;
        s.serialize_field("kind", self.kind())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}
