//! Typed error kinds the reporter and exit-code logic need to
//! distinguish. Aliasing cycles and unresolved symbol references are
//! deliberately absent from this enum: they are non-fatal diagnostics
//! surfaced only through the `Reporter`, never returned as an `Err`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportedErrorKind {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("language server failure: {0}")]
    FacadeFailure(#[source] anyhow::Error),

    #[error("project dependency cycle detected: {}", participants.join(" -> "))]
    ProjectCycle { participants: Vec<String> },

    #[error("failed to write to the output sink: {0}")]
    SinkIo(#[source] std::io::Error),
}
