//! Errores del núcleo.
//!
//! - `StepError`: fallo reportado por un step (o atrapado al ejecutarlo).
//! - `HostError`: fallos del pipeline anfitrión y de sus primitivas de I/O.
//! - `DebugUiError`: errores del wrapper que instrumenta el pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum StepError {
    #[error("step failed: {0}")] Failed(String),
    #[error("step panicked: {0}")] Panicked(String),
    #[error("step dropped its completion callback without signalling")] Abandoned,
    #[error("instrumentation: {0}")] Instrumentation(String),
}

impl StepError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error(transparent)] Step(#[from] StepError),
    #[error("write failed: {0}")] Write(String),
    #[error("read failed: {0}")] Read(String),
}

#[derive(Debug, Error)]
pub enum DebugUiError {
    #[error(transparent)] Step(#[from] StepError),
    #[error("host: {0}")] Host(HostError),
    #[error("viewer assets: {0}")] Assets(String),
    #[error("history serialization: {0}")] Serialize(#[from] serde_json::Error),
    #[error("patched build already ran for this run context")] AlreadyRan,
}

impl From<HostError> for DebugUiError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Step(e) => Self::Step(e),
            other => Self::Host(other),
        }
    }
}

impl From<DebugUiError> for StepError {
    fn from(err: DebugUiError) -> Self {
        match err {
            DebugUiError::Step(e) => e,
            other => StepError::Instrumentation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_step_errors_surface_as_step_errors() {
        let err: DebugUiError = HostError::Step(StepError::failed("boom")).into();
        assert!(matches!(err, DebugUiError::Step(StepError::Failed(ref m)) if m == "boom"));

        let err: DebugUiError = HostError::Write("disk full".into()).into();
        assert_eq!(err.to_string(), "host: write failed: disk full");
    }

    #[test]
    fn instrumentation_failures_keep_their_message() {
        let step: StepError = DebugUiError::Assets("missing client dir".into()).into();
        assert_eq!(step, StepError::Instrumentation("viewer assets: missing client dir".into()));
    }
}
