//! Run report rendering for human and machine consumers.

use std::io::{self, Write};

use eyre::{Context, Result};
use serde::Serialize;
use specsync::RunReport;

/// JSON shape of a run report.
#[derive(Serialize)]
struct ReportDoc<'a> {
    written: Vec<&'a str>,
    failures: Vec<FailureDoc<'a>>,
}

/// JSON shape of one failed unit.
#[derive(Serialize)]
struct FailureDoc<'a> {
    unit: &'a str,
    kind: &'static str,
    error: String,
}

impl<'a> From<&'a RunReport> for ReportDoc<'a> {
    fn from(report: &'a RunReport) -> Self {
        Self {
            written: report.written.iter().map(|path| path.as_str()).collect(),
            failures: report
                .failures
                .iter()
                .map(|failure| FailureDoc {
                    unit: &failure.unit,
                    kind: failure.error.kind(),
                    error: failure.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Write the report as JSON on stdout.
pub(crate) fn write_json(report: &RunReport) -> Result<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &ReportDoc::from(report))
        .wrap_err("failed to serialize run report to JSON")?;
    stdout
        .write_all(b"\n")
        .wrap_err("failed to terminate JSON output with newline")?;
    stdout.flush().wrap_err("failed to flush JSON output")
}

/// Write a human-readable summary on stdout.
pub(crate) fn write_text(report: &RunReport) -> Result<()> {
    let mut stdout = io::stdout();
    for path in &report.written {
        writeln!(stdout, "wrote {path}").wrap_err("failed to write report line")?;
    }
    for failure in &report.failures {
        writeln!(stdout, "FAILED {}: {}", failure.unit, failure.error)
            .wrap_err("failed to write report line")?;
    }
    writeln!(
        stdout,
        "{} written, {} failed",
        report.written.len(),
        report.failures.len()
    )
    .wrap_err("failed to write report summary")?;
    stdout.flush().wrap_err("failed to flush report output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use specsync::{ParseError, SyncError, UnitFailure};

    #[test]
    fn json_document_carries_kind_and_message() {
        let report = RunReport {
            written: vec!["out/a.rs".into()],
            failures: vec![UnitFailure {
                unit: "broken.feature".into(),
                error: SyncError::Parse(ParseError::MissingFeatureHeader),
            }],
        };
        let json = serde_json::to_value(ReportDoc::from(&report)).unwrap();
        assert_eq!(json["written"][0], "out/a.rs");
        assert_eq!(json["failures"][0]["unit"], "broken.feature");
        assert_eq!(json["failures"][0]["kind"], "parse");
        assert!(
            json["failures"][0]["error"]
                .as_str()
                .unwrap()
                .contains("Feature:")
        );
    }
}
