//! Scenario runner
//!
//! Reads YAML scenarios and executes them against a dashboard through the
//! page object traits, with a fixture workspace created and deleted around
//! the run. Assertions are made on semantic UI state, never raw markup.

mod config;
mod report;
mod runner;

pub use config::*;
pub use report::{print_totals, CaseReport, FailureKind, Outcome, ScenarioReport, TeardownOutcome};
pub use runner::{execute_step, not_started, run_scenario, RunOptions};
