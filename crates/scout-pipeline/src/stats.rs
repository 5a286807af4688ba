//! Per-run outcome reporting.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Outcome of one indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The run completed; new chunks may or may not have been added
    Success,
    /// No passages survived the fetch filters
    NoNewDocuments,
    /// Passages were loaded but produced no chunks
    NoChunksCreated,
    /// The run aborted with an error
    Error,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Success => "success",
            RunStatus::NoNewDocuments => "no_new_documents",
            RunStatus::NoChunksCreated => "no_chunks_created",
            RunStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Statistics for one indexing run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    /// Athlete the run was scoped to
    pub athlete_name: String,
    /// Passages that survived the fetch filters
    pub documents_loaded: usize,
    /// Chunks produced by the chunker
    pub chunks_created: usize,
    /// Chunks actually appended to the index (duplicates excluded)
    pub chunks_indexed: usize,
    /// Wall-clock duration of the run
    pub duration_seconds: f64,
    /// Run outcome
    pub status: RunStatus,
    /// Error message when `status` is [`RunStatus::Error`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunStats {
    pub(crate) fn finished(
        athlete_name: &str,
        status: RunStatus,
        documents_loaded: usize,
        chunks_created: usize,
        chunks_indexed: usize,
        duration: Duration,
    ) -> Self {
        Self {
            athlete_name: athlete_name.to_string(),
            documents_loaded,
            chunks_created,
            chunks_indexed,
            duration_seconds: duration.as_secs_f64(),
            status,
            error: None,
        }
    }

    /// Stats for a run that aborted with an error.
    pub fn failed(athlete_name: &str, error: impl Into<String>) -> Self {
        Self {
            athlete_name: athlete_name.to_string(),
            documents_loaded: 0,
            chunks_created: 0,
            chunks_indexed: 0,
            duration_seconds: 0.0,
            status: RunStatus::Error,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&RunStatus::NoNewDocuments).unwrap();
        assert_eq!(json, "\"no_new_documents\"");
        assert_eq!(RunStatus::NoChunksCreated.to_string(), "no_chunks_created");
    }

    #[test]
    fn test_failed_stats_carry_message() {
        let stats = RunStats::failed("A", "embedding service unavailable");
        assert_eq!(stats.status, RunStatus::Error);
        assert_eq!(stats.chunks_indexed, 0);

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"status\":\"error\""));
        assert!(json.contains("embedding service unavailable"));
    }

    #[test]
    fn test_error_field_omitted_on_success() {
        let stats = RunStats::finished("A", RunStatus::Success, 1, 2, 2, Duration::from_secs(1));
        let json = serde_json::to_string(&stats).unwrap();
        assert!(!json.contains("\"error\""));
    }
}
