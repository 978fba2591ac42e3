//! CLI command handling
//!
//! Dispatches CLI commands and formats their output.

use colored::Colorize;
use futures_util::stream::{self, StreamExt};

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::pageobject::{Dashboard, WebDashboard};
use crate::simulator::Simulation;
use crate::testing::{
    self, not_started, run_scenario, RunOptions, Scenario, ScenarioReport, BUILTIN_SCENARIOS,
};
use crate::workspace::{RestWorkspaceService, WorkspaceService};

/// What scenarios run against
enum Target {
    Simulated(Simulation),
    Browser {
        config: Config,
        service: RestWorkspaceService,
    },
}

/// Dispatch a CLI command
///
/// Returns whether the command succeeded; `false` maps to exit code 1.
pub async fn dispatch(command: Commands, config: Config, verbose: bool) -> Result<bool> {
    match command {
        Commands::Run {
            scenarios,
            cases,
            jobs,
            simulate,
            json,
        } => {
            let scenarios = load_all(&scenarios)?;
            check_case_names(&scenarios, &cases)?;

            let options = RunOptions {
                user: config.user.name.clone(),
                cases,
                screenshot_dir: config.screenshot_dir(),
                progress: !json,
                verbose,
            };

            let target = if simulate {
                Target::Simulated(Simulation::new().with_timeouts(config.timeouts.clone()))
            } else {
                Target::Browser {
                    service: RestWorkspaceService::new(&config),
                    config,
                }
            };

            let reports: Vec<ScenarioReport> = stream::iter(scenarios.iter())
                .map(|scenario| run_one(scenario, &target, &options))
                .buffered(jobs.max(1))
                .collect()
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else if reports.len() > 1 {
                println!();
                testing::print_totals(&reports);
            }

            Ok(reports.iter().all(ScenarioReport::passed))
        }

        Commands::List { scenarios } => {
            let sources: Vec<String> = if scenarios.is_empty() {
                BUILTIN_SCENARIOS
                    .iter()
                    .map(|(name, _)| name.to_string())
                    .collect()
            } else {
                scenarios
            };

            for source in &sources {
                let scenario = Scenario::load(source)?;
                println!("{} {}", scenario.name.white().bold(), source.dimmed());
                if let Some(desc) = &scenario.description {
                    println!("  {}", desc.dimmed());
                }
                for case in &scenario.cases {
                    match &case.description {
                        Some(desc) => println!("  - {}  {}", case.name, desc.dimmed()),
                        None => println!("  - {}", case.name),
                    }
                }
            }
            Ok(true)
        }

        Commands::Validate { scenarios } => {
            let mut all_valid = true;
            for source in &scenarios {
                match Scenario::load(source) {
                    Ok(scenario) => println!(
                        "  {} {} ({} cases)",
                        "✓".green(),
                        source,
                        scenario.cases.len()
                    ),
                    Err(e) => {
                        all_valid = false;
                        println!("  {} {}", "✗".red(), e);
                    }
                }
            }
            Ok(all_valid)
        }

        Commands::Cleanup { workspace, user } => {
            let user = user.unwrap_or_else(|| config.user.name.clone());
            RestWorkspaceService::new(&config)
                .delete(&workspace, &user)
                .await?;
            println!("{} Deleted workspace {}", "✓".green(), workspace);
            Ok(true)
        }
    }
}

fn load_all(sources: &[String]) -> Result<Vec<Scenario>> {
    sources.iter().map(|s| Scenario::load(s)).collect()
}

/// Every `--case` must name a case of at least one scenario
fn check_case_names(scenarios: &[Scenario], cases: &[String]) -> Result<()> {
    for case in cases {
        let known = scenarios
            .iter()
            .any(|s| s.cases.iter().any(|c| &c.name == case));
        if !known {
            return Err(Error::Config(format!(
                "No scenario has a case named '{}'",
                case
            )));
        }
    }
    Ok(())
}

/// Run one scenario in its own browser session
async fn run_one(scenario: &Scenario, target: &Target, options: &RunOptions) -> ScenarioReport {
    match target {
        Target::Simulated(sim) => {
            let ui = sim.dashboard();
            let service = sim.service();
            let report = run_scenario(scenario, &ui, &service, options).await;
            close_session(&ui).await;
            report
        }
        Target::Browser { config, service } => match WebDashboard::connect(config).await {
            Ok(ui) => {
                let report = run_scenario(scenario, &ui, service, options).await;
                close_session(&ui).await;
                report
            }
            Err(e) => {
                tracing::error!("Could not open browser session: {}", e);
                not_started(scenario, options, &e)
            }
        },
    }
}

async fn close_session(ui: &dyn Dashboard) {
    if let Err(e) = ui.close().await {
        tracing::warn!("Failed to close browser session: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_case_name_rejected() {
        let scenarios = load_all(&["builtin:workspace-details".to_string()]).unwrap();
        assert!(check_case_names(&scenarios, &["check_ssh_tab".to_string()]).is_ok());
        assert!(matches!(
            check_case_names(&scenarios, &["check_nothing".to_string()]),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_simulated_run_closes_session() {
        let sim = Simulation::new();
        let scenario = Scenario::load("builtin:workspace-details").unwrap();
        let options = RunOptions::new("che");
        let report = run_one(&scenario, &Target::Simulated(sim.clone()), &options).await;
        assert!(report.passed(), "{report:#?}");
        assert_eq!(sim.closed_sessions(), 1);
    }
}
