//! Scenario results
//!
//! Serializable so `run --json` can emit them unchanged.

use colored::Colorize;
use serde::Serialize;

use crate::common::Error;

/// Whether a failure was a wrong UI state or broken infrastructure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Assertion,
    Infrastructure,
}

/// Result of the setup stage or of one case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed { error: String, kind: FailureKind },
    Skipped { reason: String },
}

impl Outcome {
    pub fn failed(error: &Error) -> Self {
        let kind = if error.is_assertion() {
            FailureKind::Assertion
        } else {
            FailureKind::Infrastructure
        };
        Outcome::Failed {
            error: error.to_string(),
            kind,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Outcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped { .. })
    }
}

/// What happened to the fixture workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TeardownOutcome {
    Deleted,
    Failed { error: String },
    /// Fixture creation failed, nothing to delete
    NotCreated,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub outcome: Outcome,
    pub steps_run: usize,
    pub steps_total: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    /// Name of the fixture workspace, if it was created
    pub fixture: Option<String>,
    pub setup: Outcome,
    pub cases: Vec<CaseReport>,
    pub teardown: TeardownOutcome,
    pub duration_ms: u64,
}

impl ScenarioReport {
    /// Setup passed and no case failed
    ///
    /// Cases skipped by the case filter do not count; a failed fixture
    /// deletion is reported but does not fail the scenario.
    pub fn passed(&self) -> bool {
        self.setup.is_passed() && !self.cases.iter().any(|c| c.outcome.is_failed())
    }

    pub fn case(&self, name: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// (passed, failed, skipped) case counts
    pub fn counts(&self) -> (usize, usize, usize) {
        self.cases.iter().fold((0, 0, 0), |(p, f, s), c| match c.outcome {
            Outcome::Passed => (p + 1, f, s),
            Outcome::Failed { .. } => (p, f + 1, s),
            Outcome::Skipped { .. } => (p, f, s + 1),
        })
    }

    /// Print the one-line verdict for this scenario
    pub fn print_summary(&self) {
        let (passed, failed, skipped) = self.counts();
        let verdict = if self.passed() {
            format!("{} {}", "✓".green().bold(), "Scenario Passed".green().bold())
        } else {
            format!("{} {}", "✗".red().bold(), "Scenario Failed".red().bold())
        };
        println!(
            "\n{} {} ({} passed, {} failed, {} skipped, {} ms)",
            verdict,
            self.name.white().bold(),
            passed,
            failed,
            skipped,
            self.duration_ms
        );
        if let Outcome::Failed { error, .. } = &self.setup {
            println!("  {} {}", "Setup:".red(), error);
        }
        if let TeardownOutcome::Failed { error } = &self.teardown {
            println!("  {} {}", "Fixture cleanup failed:".yellow(), error);
        }
    }
}

/// Print the totals over several scenarios
pub fn print_totals(reports: &[ScenarioReport]) {
    let failed = reports.iter().filter(|r| !r.passed()).count();
    let total = reports.len();
    if failed == 0 {
        println!(
            "{}",
            format!("All {} scenario(s) passed", total).green().bold()
        );
    } else {
        println!(
            "{}",
            format!("{} of {} scenario(s) failed", failed, total).red().bold()
        );
        for report in reports.iter().filter(|r| !r.passed()) {
            println!("  {} {}", "✗".red(), report.name);
        }
    }
}
