//! Output formatting for human and JSON modes.

use txprop_engine::{ExpectedOutcome, Scenario, ScenarioReport};

/// How to render results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

fn outcome_label(outcome: ExpectedOutcome) -> &'static str {
    match outcome {
        ExpectedOutcome::Ok => "ok",
        ExpectedOutcome::OperationFailed => "operation failed",
        ExpectedOutcome::UnexpectedRollback => "unexpected rollback",
    }
}

/// The scenario catalog
pub fn format_catalog(mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => {
            let entries: Vec<_> = Scenario::ALL
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "scenario": s,
                        "description": s.description(),
                        "expectation": s.expectation(),
                    })
                })
                .collect();
            serde_json::to_string_pretty(&entries).unwrap_or_else(|e| e.to_string())
        }
        OutputMode::Human => Scenario::ALL
            .iter()
            .map(|s| {
                let expected = s.expectation();
                format!(
                    "{:<42} {} persisted, {:<20} {}",
                    s.name(),
                    expected.persisted,
                    outcome_label(expected.outcome),
                    s.description()
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// One scenario report
pub fn format_report(report: &ScenarioReport, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => {
            serde_json::to_string_pretty(report).unwrap_or_else(|e| e.to_string())
        }
        OutputMode::Human => {
            let mut lines = Vec::new();
            let verdict = if report.matches_expectation {
                "PASS"
            } else {
                "FAIL"
            };
            lines.push(format!("{} {}", verdict, report.scenario));
            match &report.error {
                Some(err) => lines.push(format!("  error:     {} ({})", err.message, err.kind)),
                None => {
                    let returned: Vec<_> =
                        report.returned.iter().map(|r| r.to_string()).collect();
                    lines.push(format!("  returned:  [{}]", returned.join(", ")));
                }
            }
            for txn in &report.transactions {
                lines.push(format!(
                    "  {}: {}, {} write(s){}",
                    txn.txn_id,
                    txn.state,
                    txn.writes,
                    if txn.rollback_only {
                        ", rollback-only"
                    } else {
                        ""
                    }
                ));
            }
            let persisted: Vec<_> = report.persisted.iter().map(|r| r.to_string()).collect();
            lines.push(format!("  persisted: [{}]", persisted.join(", ")));
            lines.push(format!(
                "  expected:  {} persisted, {}",
                report.expectation.persisted,
                outcome_label(report.expectation.outcome)
            ));
            lines.join("\n")
        }
    }
}

/// Totals after `run-all`
pub fn format_summary(reports: &[ScenarioReport], mode: OutputMode) -> String {
    let passed = reports.iter().filter(|r| r.matches_expectation).count();
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "passed": passed,
            "failed": reports.len() - passed,
            "reports": reports,
        }))
        .unwrap_or_else(|e| e.to_string()),
        OutputMode::Human => format!("{}/{} scenarios as expected", passed, reports.len()),
    }
}

/// A fatal error
pub fn format_error(message: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::json!({ "error": message }).to_string(),
        OutputMode::Human => format!("(error) {}", message),
    }
}
