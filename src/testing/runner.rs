//! Scenario runner implementation
//!
//! Creates the fixture workspace, drives the dashboard through the page
//! object traits and deletes the fixture again, whatever the cases did.

use std::path::{Path, PathBuf};
use std::time::Instant;

use colored::Colorize;
use tracing::Instrument;

use crate::common::{paths, Error, Result};
use crate::pageobject::{
    Dashboard, DashboardUi, DialogButton, OverviewTab, ServersTab, SshTab, VolumesTab,
    WorkspaceDetails, WorkspaceList,
};
use crate::workspace::WorkspaceService;

use super::config::{FixtureContext, Scenario, Step, TestCase, DEFAULT_SAVE_NOTIFICATION};
use super::report::{CaseReport, Outcome, ScenarioReport, TeardownOutcome};

/// Per-run settings
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Dashboard user owning the fixture
    pub user: String,
    /// Cases to run; empty runs every case
    pub cases: Vec<String>,
    /// Where failure screenshots go; None disables them
    pub screenshot_dir: Option<PathBuf>,
    /// Print progress lines to stdout
    pub progress: bool,
    /// Print every step, not only failures
    pub verbose: bool,
}

impl RunOptions {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    fn selects(&self, case: &str) -> bool {
        self.cases.is_empty() || self.cases.iter().any(|c| c == case)
    }
}

/// Run a scenario against a dashboard and fixture service
///
/// Never fails as a whole: every problem ends up in the report.
pub async fn run_scenario(
    scenario: &Scenario,
    ui: &dyn DashboardUi,
    service: &dyn WorkspaceService,
    options: &RunOptions,
) -> ScenarioReport {
    let span = tracing::info_span!("scenario", name = %scenario.name);
    run_scenario_inner(scenario, ui, service, options)
        .instrument(span)
        .await
}

async fn run_scenario_inner(
    scenario: &Scenario,
    ui: &dyn DashboardUi,
    service: &dyn WorkspaceService,
    options: &RunOptions,
) -> ScenarioReport {
    let started = Instant::now();

    if options.progress {
        println!(
            "\n{} {}",
            "Running Scenario:".blue().bold(),
            scenario.name.white().bold()
        );
        if let Some(desc) = &scenario.description {
            println!("  {}", desc.dimmed());
        }
    }

    // Fixture
    let workspace = match service.create(&scenario.fixture, &options.user).await {
        Ok(workspace) => workspace,
        Err(e) => {
            tracing::error!("Fixture creation failed: {}", e);
            if options.progress {
                println!("  {} Fixture: {}", "✗".red(), e);
            }
            let setup = Outcome::failed(&Error::Fixture(e.to_string()));
            return ScenarioReport {
                name: scenario.name.clone(),
                fixture: None,
                setup,
                cases: skip_all(scenario, options, "fixture creation failed"),
                teardown: TeardownOutcome::NotCreated,
                duration_ms: elapsed_ms(started),
            };
        }
    };
    tracing::info!(workspace = %workspace.name, "Fixture created");
    if options.progress {
        println!("  {} Fixture {}", "✓".green(), workspace.name.dimmed());
    }
    let ctx = FixtureContext::new(&workspace.name, &options.user);

    // Setup
    if options.progress && !scenario.setup.is_empty() {
        println!("\n{}", "Setup:".cyan());
    }
    let setup = match run_steps(&scenario.setup, ui, &ctx, options).await {
        Ok(()) => Outcome::Passed,
        Err((_, e)) => {
            tracing::error!("Setup failed: {}", e);
            save_screenshot(ui, scenario, "setup", options).await;
            Outcome::failed(&e)
        }
    };

    // Cases
    let mut cases = Vec::with_capacity(scenario.cases.len());
    for case in &scenario.cases {
        let report = if !options.selects(&case.name) {
            skipped(case, "not selected")
        } else if !setup.is_passed() {
            skipped(case, "setup failed")
        } else {
            let span = tracing::info_span!("case", name = %case.name);
            run_case(scenario, case, ui, &ctx, options)
                .instrument(span)
                .await
        };
        cases.push(report);
    }

    // Teardown UI steps are best effort
    if !scenario.teardown.is_empty() {
        if options.progress {
            println!("\n{}", "Teardown:".cyan());
        }
        if let Err((_, e)) = run_steps(&scenario.teardown, ui, &ctx, options).await {
            tracing::warn!("Teardown step failed: {}", e);
        }
    }

    let teardown = match service.delete(&workspace.name, &options.user).await {
        Ok(()) => {
            tracing::info!(workspace = %workspace.name, "Fixture deleted");
            TeardownOutcome::Deleted
        }
        Err(e) => {
            tracing::error!(workspace = %workspace.name, "Fixture deletion failed: {}", e);
            TeardownOutcome::Failed {
                error: e.to_string(),
            }
        }
    };

    let report = ScenarioReport {
        name: scenario.name.clone(),
        fixture: Some(workspace.name),
        setup,
        cases,
        teardown,
        duration_ms: elapsed_ms(started),
    };
    if options.progress {
        report.print_summary();
    }
    report
}

/// Report for a scenario that could not start, e.g. no browser session
pub fn not_started(scenario: &Scenario, options: &RunOptions, error: &Error) -> ScenarioReport {
    if options.progress {
        println!(
            "\n{} {}: {}",
            "✗".red().bold(),
            scenario.name.white().bold(),
            error
        );
    }
    ScenarioReport {
        name: scenario.name.clone(),
        fixture: None,
        setup: Outcome::failed(error),
        cases: skip_all(scenario, options, "scenario not started"),
        teardown: TeardownOutcome::NotCreated,
        duration_ms: 0,
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn skipped(case: &TestCase, reason: &str) -> CaseReport {
    CaseReport {
        name: case.name.clone(),
        outcome: Outcome::skipped(reason),
        steps_run: 0,
        steps_total: case.steps.len(),
        duration_ms: 0,
    }
}

fn skip_all(scenario: &Scenario, options: &RunOptions, reason: &str) -> Vec<CaseReport> {
    scenario
        .cases
        .iter()
        .map(|case| {
            if options.selects(&case.name) {
                skipped(case, reason)
            } else {
                skipped(case, "not selected")
            }
        })
        .collect()
}

async fn run_case(
    scenario: &Scenario,
    case: &TestCase,
    ui: &dyn DashboardUi,
    ctx: &FixtureContext,
    options: &RunOptions,
) -> CaseReport {
    let started = Instant::now();
    let steps_total = case.steps.len();

    if options.progress {
        println!("\n{} {}", "Case:".cyan(), case.name);
    }

    let (outcome, steps_run) = match run_steps(&case.steps, ui, ctx, options).await {
        Ok(()) => (Outcome::Passed, steps_total),
        Err((step_num, e)) => {
            tracing::warn!(step = step_num, "Case failed: {}", e);
            save_screenshot(ui, scenario, &case.name, options).await;
            (Outcome::failed(&e), step_num)
        }
    };

    CaseReport {
        name: case.name.clone(),
        outcome,
        steps_run,
        steps_total,
        duration_ms: elapsed_ms(started),
    }
}

/// Run steps in order, stopping at the first failure
///
/// The error carries the 1-based number of the failed step.
async fn run_steps(
    steps: &[Step],
    ui: &dyn DashboardUi,
    ctx: &FixtureContext,
    options: &RunOptions,
) -> std::result::Result<(), (usize, Error)> {
    for (i, step) in steps.iter().enumerate() {
        let step_num = i + 1;
        let resolved = step.resolve(ctx).map_err(|e| (step_num, e))?;
        tracing::debug!(step = step_num, "{}", resolved);

        match execute_step(ui, &resolved).await {
            Ok(()) => {
                if options.progress && options.verbose {
                    println!(
                        "  {} Step {}: {}",
                        "✓".green(),
                        step_num,
                        resolved.to_string().dimmed()
                    );
                }
            }
            Err(e) => {
                if options.progress {
                    println!("  {} Step {}: {}: {}", "✗".red(), step_num, resolved, e);
                }
                return Err((step_num, e));
            }
        }
    }
    if options.progress && !options.verbose && !steps.is_empty() {
        println!("  {} {} step(s)", "✓".green(), steps.len());
    }
    Ok(())
}

/// Execute a single resolved step
pub async fn execute_step(ui: &dyn DashboardUi, step: &Step) -> Result<()> {
    match step {
        Step::OpenDashboard => ui.open().await,
        Step::SelectNavigation { item } => ui.select_navigation_item(*item).await,
        Step::WaitToolbarTitle { title } => ui.wait_toolbar_title(title).await,
        Step::SelectWorkspace { name } => ui.select_workspace(name).await,
        Step::SelectTab { tab } => ui.select_tab(*tab).await,
        Step::ClickDialogButton { button } => ui.click_dialog_button(*button).await,
        Step::SaveChanges { notification } => {
            let message = notification.as_deref().unwrap_or(DEFAULT_SAVE_NOTIFICATION);
            save_changes(ui, message).await
        }
        Step::WaitNotification { message } => ui.wait_notification(message).await,
        Step::WaitNotificationClosed => ui.wait_notification_closed().await,
        Step::AssertWorkspaceName { name } => {
            let actual = ui.workspace_name().await?;
            expect(
                &actual == name,
                format!("workspace name: expected '{}', got '{}'", name, actual),
            )
        }
        Step::AssertDeleteWorkspaceButton => expect(
            ui.delete_workspace_button_exists().await?,
            "delete workspace button is not shown",
        ),
        Step::ExportWorkspace => {
            ui.click_export().await?;
            ui.wait_export_controls().await?;
            ui.hide_export().await
        }
        Step::AddServer {
            reference,
            port,
            protocol,
        } => {
            ui.click_add_server().await?;
            ui.wait_add_server_dialog().await?;
            ui.enter_reference(reference).await?;
            ui.enter_port(port).await?;
            ui.enter_protocol(protocol).await?;
            ui.click_dialog_button(DialogButton::Add).await
        }
        Step::EditServer {
            reference,
            new_reference,
            port,
            protocol,
        } => {
            ui.click_edit_server(reference).await?;
            if let Some(new_reference) = new_reference {
                ui.enter_reference(new_reference).await?;
            }
            if let Some(port) = port {
                ui.enter_port(port).await?;
            }
            if let Some(protocol) = protocol {
                ui.enter_protocol(protocol).await?;
            }
            ui.click_dialog_button(DialogButton::Update).await
        }
        Step::DeleteServer { reference } => {
            ui.click_delete_server(reference).await?;
            ui.click_dialog_button(DialogButton::Delete).await
        }
        Step::AssertServer {
            reference,
            port,
            exists: true,
        } => expect(
            ui.server_exists(reference, port).await?,
            format!("server '{}' with port {} is not listed", reference, port),
        ),
        Step::AssertServer {
            reference,
            port,
            exists: false,
        } => ui.wait_server_absent(reference, port).await,
        Step::AssertSshKeys { present: true } => {
            let private = ui.private_key_exists().await?;
            let public = ui.public_key_exists().await?;
            expect(
                private && public,
                format!(
                    "expected both SSH keys, private shown: {}, public shown: {}",
                    private, public
                ),
            )
        }
        Step::AssertSshKeys { present: false } => ui.wait_ssh_key_absent().await,
        Step::RemoveDefaultSshKey => {
            ui.click_remove_default_key().await?;
            ui.wait_ssh_key_absent().await
        }
        Step::GenerateSshKey => ui.click_generate_key().await,
        Step::AddVolume { name, path } => {
            ui.click_add_volume().await?;
            ui.enter_volume_name(name).await?;
            ui.enter_volume_path(path).await?;
            ui.click_dialog_button(DialogButton::Add).await
        }
        Step::EditVolume {
            name,
            new_name,
            new_path,
        } => {
            ui.click_edit_volume(name).await?;
            if let Some(new_name) = new_name {
                ui.enter_volume_name(new_name).await?;
            }
            if let Some(new_path) = new_path {
                ui.enter_volume_path(new_path).await?;
            }
            ui.click_dialog_button(DialogButton::Update).await
        }
        Step::RemoveVolume { name } => {
            ui.click_remove_volume(name).await?;
            ui.click_dialog_button(DialogButton::Delete).await
        }
        Step::AssertVolume {
            name,
            path,
            exists: true,
        } => expect(
            ui.volume_exists(name, path.as_deref()).await?,
            match path {
                Some(path) => format!("volume '{}' at {} is not listed", name, path),
                None => format!("volume '{}' is not listed", name),
            },
        ),
        Step::AssertVolume {
            name, exists: false, ..
        } => ui.wait_volume_absent(name).await,
    }
}

/// Click save, then wait for the notification to appear and go away
///
/// A missing notification is a failed save, not a plain timeout.
async fn save_changes(ui: &dyn DashboardUi, message: &str) -> Result<()> {
    ui.click_save_changes().await?;
    match ui.wait_notification(message).await {
        Ok(()) => {}
        Err(Error::WaitTimeout { what, secs }) => {
            return Err(Error::SaveFailed(format!(
                "no '{}' notification after {} seconds ({})",
                message, secs, what
            )));
        }
        Err(e) => return Err(e),
    }
    ui.wait_notification_closed().await
}

fn expect(condition: bool, message: impl Into<String>) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::Assertion(message.into()))
    }
}

/// Write a PNG of the current page; failures are only logged
async fn save_screenshot(ui: &dyn DashboardUi, scenario: &Scenario, name: &str, options: &RunOptions) {
    let Some(dir) = &options.screenshot_dir else {
        return;
    };
    let dir = dir.join(paths::sanitize_file_name(&scenario.name));
    let path = dir.join(format!("{}.png", paths::sanitize_file_name(name)));

    match capture(ui, &dir, &path).await {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Saved screenshot");
            if options.progress {
                println!("    screenshot: {}", path.display().to_string().dimmed());
            }
        }
        Err(e) => tracing::warn!("Could not save screenshot: {}", e),
    }
}

async fn capture(ui: &dyn DashboardUi, dir: &Path, path: &Path) -> Result<()> {
    let png = ui.screenshot().await?;
    paths::ensure_dir(dir)?;
    std::fs::write(path, png)?;
    Ok(())
}
