use crate::error::Error;
use crate::history::{self, RunEntry};
use crate::ingest::{self, SummaryRecord};
use chrono::Local;
use log::debug;
use std::path::Path;

/// Ingest a JUnit XML report and append one run entry to the history file.
///
/// Returns the run summary together with the timestamp recorded for the
/// entry. The history is never touched when ingestion fails.
pub fn record_run(
    report: &Path,
    version: &str,
    notes: &str,
    history_path: &Path,
) -> Result<(SummaryRecord, String), Error> {
    let (summary, tests) = ingest::parse_junit_file(report)?;

    let timestamp = Local::now().to_rfc3339();
    debug!(
        "recording {} cases from {} as version {}",
        tests.len(),
        report.display(),
        version
    );

    let entry = RunEntry {
        timestamp: timestamp.clone(),
        version: version.to_string(),
        notes: notes.to_string(),
        summary: summary.clone(),
        tests,
    };
    history::append(history_path, entry)?;

    Ok((summary, timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::CaseStatus;
    use chrono::DateTime;
    use std::fs;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn temp_path(suffix: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bug_history_rec_{}{}", Uuid::new_v4(), suffix))
    }

    #[test]
    fn test_record_first_run() {
        let report = temp_path(".xml");
        let history = temp_path(".json");
        fs::write(
            &report,
            r#"<testsuite tests="2" failures="0" errors="0" skipped="0" time="0.10">
                <testcase name="t1" classname="C" time="0.05"/>
                <testcase name="t2" classname="C" time="0.05"/>
            </testsuite>"#,
        )
        .unwrap();

        let (summary, timestamp) = record_run(&report, "v1", "smoke", &history).unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.success_rate, 100.0);
        assert!(DateTime::parse_from_rfc3339(&timestamp).is_ok());

        let entries = crate::history::load(&history).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].timestamp, timestamp);
        assert_eq!(entries[0].version, "v1");
        assert_eq!(entries[0].notes, "smoke");
        assert_eq!(entries[0].tests.len(), 2);
        assert!(entries[0]
            .tests
            .iter()
            .all(|c| c.status == CaseStatus::Passed));

        let _ = fs::remove_file(&report);
        let _ = fs::remove_file(&history);
    }

    #[test]
    fn test_runs_accumulate_in_order() {
        let report = temp_path(".xml");
        let history = temp_path(".json");
        fs::write(
            &report,
            r#"<testsuite tests="1" failures="1" errors="0" skipped="0">
                <testcase name="bad" classname="C"><failure message="m">trace</failure></testcase>
            </testsuite>"#,
        )
        .unwrap();

        record_run(&report, "v1", "", &history).unwrap();
        record_run(&report, "v2", "retry", &history).unwrap();

        let entries = crate::history::load(&history).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].version, "v1");
        assert_eq!(entries[1].version, "v2");
        assert_eq!(entries[1].summary.failed, 1);
        assert_eq!(entries[1].tests[0].message, "m");

        let _ = fs::remove_file(&report);
        let _ = fs::remove_file(&history);
    }

    #[test]
    fn test_failed_ingest_leaves_history_alone() {
        let report = temp_path(".xml");
        let history = temp_path(".json");
        fs::write(&report, "not a junit report").unwrap();

        assert!(record_run(&report, "v1", "", &history).is_err());
        assert!(!history.exists());

        let _ = fs::remove_file(&report);
    }
}
