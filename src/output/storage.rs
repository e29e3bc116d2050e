use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use super::formatter::Report;

/// Envelope written to disk; the timestamp lives here, never in the assessment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReport<'a> {
    pub kind: &'static str,
    pub generated_at: DateTime<Utc>,
    pub assessment: &'a Report,
}

/// Save a report as pretty JSON atomically
///
/// Uses atomic-write-file so a crash never leaves a half-written report.
/// Creates the parent directory if it doesn't exist.
pub fn save_report(path: &Path, report: &Report, generated_at: DateTime<Utc>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    let envelope = SavedReport {
        kind: report.kind(),
        generated_at,
        assessment: report,
    };
    serde_json::to_writer_pretty(&mut file, &envelope).context("Failed to serialize report")?;

    file.commit().context("Failed to save report")?;
    debug!(path = %path.display(), kind = report.kind(), "saved report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::bedroom::{assess_bedroom, BedroomChecklist};
    use chrono::TimeZone;

    fn sample() -> Report {
        Report::Bedroom(assess_bedroom(&BedroomChecklist {
            tv_in_bedroom: true,
            ..BedroomChecklist::default()
        }))
    }

    #[test]
    fn test_save_writes_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("bedroom.json");
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        save_report(&path, &sample(), at).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["kind"], "bedroom");
        assert_eq!(value["generatedAt"], "2026-03-01T12:00:00Z");
        assert_eq!(value["assessment"]["issuesFound"], 1);
    }

    #[test]
    fn test_same_input_same_assessment_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        save_report(&a, &sample(), at).unwrap();
        save_report(&b, &sample(), at).unwrap();
        assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
    }
}
