use serde::{Deserialize, Serialize};

/// Outcome of a single test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    Failed,
    Error,
    Skipped,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Passed => "passed",
            CaseStatus::Failed => "failed",
            CaseStatus::Error => "error",
            CaseStatus::Skipped => "skipped",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CaseStatus::Passed | CaseStatus::Skipped)
    }
}

/// One executed test case as reported by the runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Short hex token, unique within the run
    pub id: String,
    pub name: String,
    /// Fully-qualified containing group name (JUnit `classname`)
    pub class: String,
    pub status: CaseStatus,
    /// Execution time in seconds
    pub time: f64,
    /// Failure/error headline; empty for passed and skipped cases
    pub message: String,
    /// Full failure/error text; empty for passed and skipped cases
    pub detail: String,
}

/// Aggregate counts for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub errors: u32,
    pub skipped: u32,
    /// Wall-clock time of the whole suite in seconds
    pub execution_time: f64,
    /// Percentage of passed cases in [0, 100], two decimal places
    pub success_rate: f64,
}

/// Percentage of passed cases, rounded to two decimal places.
/// An empty run rates 0.0 rather than dividing by zero.
pub fn success_rate(passed: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (100.0 * passed as f64 / total as f64 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_rounding() {
        assert_eq!(success_rate(1, 3), 33.33);
        assert_eq!(success_rate(2, 3), 66.67);
        assert_eq!(success_rate(2, 2), 100.0);
        assert_eq!(success_rate(0, 5), 0.0);
    }

    #[test]
    fn test_success_rate_empty_run() {
        assert_eq!(success_rate(0, 0), 0.0);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CaseStatus::Passed).unwrap(),
            "\"passed\""
        );
        assert_eq!(
            serde_json::to_string(&CaseStatus::Error).unwrap(),
            "\"error\""
        );
        let back: CaseStatus = serde_json::from_str("\"skipped\"").unwrap();
        assert_eq!(back, CaseStatus::Skipped);
    }

    #[test]
    fn test_case_record_round_trip() {
        let case = CaseRecord {
            id: "a1b2c3d4".to_string(),
            name: "test_login".to_string(),
            class: "tests.auth.TestLogin".to_string(),
            status: CaseStatus::Failed,
            time: 0.42,
            message: "assertion failed".to_string(),
            detail: "Traceback (most recent call last): ...".to_string(),
        };

        let json = serde_json::to_string(&case).unwrap();
        let back: CaseRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, case);
    }
}
