use crate::constants::RUN_STAMP_FORMAT;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal state of one user's pass through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded,
    Failed,
}

/// Per-user entry in the aggregate report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserOutcome {
    pub user_id: u64,
    pub user_name: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate report written once at run end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_seconds: f64,
    pub total_users: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<UserOutcome>,
}

/// Accumulates per-user outcomes while the run is in flight.
pub struct RunStats {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    outcomes: Vec<UserOutcome>,
}

impl RunStats {
    pub fn begin() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    /// Timestamp component shared by every output filename of this run.
    pub fn run_stamp(&self) -> String {
        self.started_at.format(RUN_STAMP_FORMAT).to_string()
    }

    pub fn record_success(&mut self, user_id: u64, user_name: &str, output_file: String) {
        self.outcomes.push(UserOutcome {
            user_id,
            user_name: user_name.to_string(),
            status: OutcomeStatus::Succeeded,
            output_file: Some(output_file),
            error: None,
        });
    }

    pub fn record_failure(&mut self, user_id: u64, user_name: &str, error: impl Into<String>) {
        self.outcomes.push(UserOutcome {
            user_id,
            user_name: user_name.to_string(),
            status: OutcomeStatus::Failed,
            output_file: None,
            error: Some(error.into()),
        });
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Succeeded)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Finalizes the report. Counts derive from the outcome list, so
    /// succeeded + failed always equals the number of recorded users.
    pub fn finish(self) -> EtlReport {
        let finished_at = Utc::now();
        let succeeded = self.succeeded();
        let failed = self.failed();
        EtlReport {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at,
            elapsed_seconds: (finished_at - self.started_at).num_milliseconds() as f64 / 1000.0,
            total_users: self.outcomes.len(),
            succeeded,
            failed,
            outcomes: self.outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_match_outcomes() {
        let mut stats = RunStats::begin();
        stats.record_success(1, "Alice", "out/user_1_x.json".to_string());
        stats.record_failure(2, "Bob", "generation failed");
        stats.record_success(3, "Carol", "out/user_3_x.json".to_string());

        let report = stats.finish();
        assert_eq!(report.total_users, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded + report.failed, report.total_users);
    }

    #[test]
    fn test_empty_run_produces_zero_report() {
        let report = RunStats::begin().finish();
        assert_eq!(report.total_users, 0);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed, 0);
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_failure_outcome_has_error_but_no_file() {
        let mut stats = RunStats::begin();
        stats.record_failure(9, "Dave", "timed out");
        let report = stats.finish();
        let outcome = &report.outcomes[0];
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert!(outcome.output_file.is_none());
        assert_eq!(outcome.error.as_deref(), Some("timed out"));
    }

    #[test]
    fn test_run_stamp_format() {
        let stats = RunStats::begin();
        let stamp = stats.run_stamp();
        // %Y%m%d_%H%M%S
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.chars().nth(8), Some('_'));
    }
}
