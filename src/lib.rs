//! Workspace dashboard scenario runner
//!
//! Scenarios are declared in YAML and executed through page object traits,
//! implemented for a real browser over WebDriver and for an in-memory
//! simulation of the dashboard.

pub mod cli;
pub mod commands;
pub mod common;
pub mod pageobject;
pub mod simulator;
pub mod testing;
pub mod webdriver;
pub mod workspace;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use testing::{run_scenario, RunOptions, Scenario, ScenarioReport};
