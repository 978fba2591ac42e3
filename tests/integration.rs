//! End-to-end integration tests for the scenario runner
//!
//! These tests drive complete scenarios against the simulated dashboard:
//! 1. Through the library, inspecting reports and simulated backend state
//! 2. Through the compiled binary with `--simulate`

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use async_trait::async_trait;
use dashboard_e2e::simulator::{SimulatedWorkspaceService, Simulation};
use dashboard_e2e::testing::{FailureKind, Outcome, TeardownOutcome};
use dashboard_e2e::workspace::{FixtureSpec, TestWorkspace, WorkspaceService};
use dashboard_e2e::{run_scenario, Result, RunOptions, Scenario, ScenarioReport};
use tempfile::TempDir;

const BUILTIN: &str = "builtin:workspace-details";

/// Setup used by the hand-written scenarios below
const SETUP: &str = r#"
setup:
  - action: open_dashboard
  - action: select_navigation
    item: workspaces
  - action: wait_toolbar_title
    title: Workspaces
  - action: select_workspace
    name: ${workspace}
  - action: wait_toolbar_title
    title: ${workspace}
"#;

fn scenario_with_cases(name: &str, cases: &str) -> Scenario {
    let yaml = format!("name: {}\n{}\ncases:\n{}", name, SETUP, cases);
    Scenario::parse(&yaml, name).expect("test scenario must parse")
}

async fn run(sim: &Simulation, scenario: &Scenario, options: &RunOptions) -> ScenarioReport {
    let ui = sim.dashboard();
    let service = sim.service();
    run_scenario(scenario, &ui, &service, options).await
}

/// Fixture service that records deletions but keeps the workspace around,
/// so its final state can be inspected after the run
struct KeepingService {
    inner: SimulatedWorkspaceService,
    deleted: Mutex<Vec<String>>,
}

impl KeepingService {
    fn new(sim: &Simulation) -> Self {
        Self {
            inner: sim.service(),
            deleted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WorkspaceService for KeepingService {
    async fn create(&self, spec: &FixtureSpec, user: &str) -> Result<TestWorkspace> {
        self.inner.create(spec, user).await
    }

    async fn delete(&self, name: &str, _user: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

// ============== Library tests ==============

#[tokio::test]
async fn test_builtin_scenario_passes() {
    let sim = Simulation::new();
    let scenario = Scenario::load(BUILTIN).unwrap();
    let report = run(&sim, &scenario, &RunOptions::new("che")).await;

    assert!(report.passed(), "{report:#?}");
    assert_eq!(report.counts(), (4, 0, 0));
    assert_eq!(report.teardown, TeardownOutcome::Deleted);

    let fixture = report.fixture.clone().unwrap();
    assert!(fixture.starts_with("wksp-"));
    assert_eq!(sim.deletions(), vec![fixture]);
    assert!(sim.workspace_names().is_empty());

    for case in &report.cases {
        assert_eq!(case.steps_run, case.steps_total, "{}", case.name);
    }
}

#[tokio::test]
async fn test_builtin_scenario_final_state() {
    let sim = Simulation::new();
    let scenario = Scenario::load(BUILTIN).unwrap();
    let ui = sim.dashboard();
    let service = KeepingService::new(&sim);

    let report = run_scenario(&scenario, &ui, &service, &RunOptions::new("che")).await;
    assert!(report.passed(), "{report:#?}");

    let fixture = report.fixture.unwrap();
    assert_eq!(*service.deleted.lock().unwrap(), vec![fixture.clone()]);

    let saved = sim.workspace(&fixture).unwrap();
    let servers: Vec<_> = saved
        .servers
        .iter()
        .map(|s| (s.reference.as_str(), s.port.as_str(), s.protocol.as_str()))
        .collect();
    assert_eq!(servers, vec![("agent", "8082", "https")]);
    assert!(saved.volumes.is_empty());
}

#[tokio::test]
async fn test_failing_case_still_deletes_fixture_once() {
    let sim = Simulation::new();
    let scenario = scenario_with_cases(
        "failing-case",
        r#"
  - name: wrong_name
    steps:
      - action: assert_workspace_name
        name: not-the-fixture
      - action: assert_delete_workspace_button
  - name: right_name
    steps:
      - action: select_tab
        tab: overview
      - action: assert_workspace_name
        name: ${workspace}
"#,
    );
    let report = run(&sim, &scenario, &RunOptions::new("che")).await;

    assert!(!report.passed());
    let wrong = report.case("wrong_name").unwrap();
    assert_eq!(wrong.steps_run, 1);
    match &wrong.outcome {
        Outcome::Failed { error, kind } => {
            assert_eq!(*kind, FailureKind::Assertion);
            assert!(error.contains("not-the-fixture"), "{error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(report.case("right_name").unwrap().outcome.is_passed());

    assert_eq!(sim.deletions().len(), 1);
    assert_eq!(report.teardown, TeardownOutcome::Deleted);
}

#[tokio::test]
async fn test_setup_failure_skips_cases_and_deletes_fixture() {
    let sim = Simulation::new();
    let yaml = r#"
name: broken-setup
setup:
  - action: open_dashboard
  - action: select_navigation
    item: workspaces
  - action: select_workspace
    name: some-other-workspace
cases:
  - name: never_runs
    steps:
      - action: assert_delete_workspace_button
"#;
    let scenario = Scenario::parse(yaml, "broken-setup").unwrap();
    let report = run(&sim, &scenario, &RunOptions::new("che")).await;

    assert!(!report.passed());
    assert!(report.setup.is_failed());
    assert_eq!(
        report.case("never_runs").unwrap().outcome,
        Outcome::skipped("setup failed")
    );
    assert_eq!(sim.deletions(), vec![report.fixture.clone().unwrap()]);
}

#[tokio::test]
async fn test_fixture_creation_failure_deletes_nothing() {
    let sim = Simulation::new();
    sim.fail_creates(Some("quota exceeded"));
    let scenario = Scenario::load(BUILTIN).unwrap();
    let report = run(&sim, &scenario, &RunOptions::new("che")).await;

    assert!(!report.passed());
    assert!(report.fixture.is_none());
    assert_eq!(report.teardown, TeardownOutcome::NotCreated);
    assert!(report.cases.iter().all(|c| c.outcome.is_skipped()));
    assert!(sim.deletions().is_empty());
}

#[tokio::test]
async fn test_failed_save_reported_as_save_failure() {
    let sim = Simulation::new();
    sim.fail_saves(true);
    let scenario = scenario_with_cases(
        "failing-save",
        r#"
  - name: add_volume
    steps:
      - action: select_tab
        tab: volumes
      - action: add_volume
        name: prj
        path: /prj
      - action: save_changes
      - action: assert_volume
        name: prj
"#,
    );
    let report = run(&sim, &scenario, &RunOptions::new("che")).await;

    let case = report.case("add_volume").unwrap();
    assert_eq!(case.steps_run, 3);
    match &case.outcome {
        Outcome::Failed { error, .. } => {
            assert!(error.starts_with("Saving workspace changes failed"), "{error}")
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(sim.deletions().len(), 1);
}

#[tokio::test]
async fn test_teardown_failure_does_not_fail_scenario() {
    let sim = Simulation::new();
    sim.fail_deletes(Some("backend unavailable"));
    let scenario = Scenario::load(BUILTIN).unwrap();
    let report = run(&sim, &scenario, &RunOptions::new("che")).await;

    assert!(report.passed());
    match &report.teardown {
        TeardownOutcome::Failed { error } => assert!(error.contains("backend unavailable")),
        other => panic!("expected teardown failure, got {other:?}"),
    }
    assert_eq!(sim.deletions().len(), 1);
}

#[tokio::test]
async fn test_case_filter_skips_unselected_cases() {
    let sim = Simulation::new();
    let scenario = Scenario::load(BUILTIN).unwrap();
    let options = RunOptions {
        cases: vec!["check_ssh_tab".to_string()],
        ..RunOptions::new("che")
    };
    let report = run(&sim, &scenario, &options).await;

    assert!(report.passed());
    assert_eq!(report.counts(), (1, 0, 3));
    assert_eq!(
        report.case("check_overview_tab").unwrap().outcome,
        Outcome::skipped("not selected")
    );
}

#[tokio::test]
async fn test_teardown_steps_are_best_effort() {
    let sim = Simulation::new();
    let yaml = format!(
        "name: with-teardown\n{}\ncases:\n{}\nteardown:\n{}",
        SETUP,
        r#"
  - name: overview
    steps:
      - action: assert_delete_workspace_button
"#,
        r#"
  - action: select_tab
    tab: servers
  - action: delete_server
    reference: missing
"#
    );
    let scenario = Scenario::parse(&yaml, "with-teardown").unwrap();
    let report = run(&sim, &scenario, &RunOptions::new("che")).await;

    assert!(report.passed(), "{report:#?}");
    assert_eq!(report.teardown, TeardownOutcome::Deleted);
}

#[tokio::test]
async fn test_screenshot_written_for_failed_case() {
    let sim = Simulation::new();
    let dir = TempDir::new().unwrap();
    let scenario = scenario_with_cases(
        "screenshots",
        r#"
  - name: missing server
    steps:
      - action: select_tab
        tab: servers
      - action: assert_server
        reference: nope
        port: 1
"#,
    );
    let options = RunOptions {
        screenshot_dir: Some(dir.path().to_path_buf()),
        ..RunOptions::new("che")
    };
    let report = run(&sim, &scenario, &options).await;

    assert!(!report.passed());
    let png = dir.path().join("screenshots").join("missing_server.png");
    let bytes = std::fs::read(&png).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn test_parallel_scenarios_use_separate_fixtures() {
    let sim = Simulation::new();
    let scenario = Scenario::load(BUILTIN).unwrap();
    let options = RunOptions::new("che");

    let (a, b) = tokio::join!(
        run(&sim, &scenario, &options),
        run(&sim, &scenario, &options)
    );
    assert!(a.passed() && b.passed());
    assert_ne!(a.fixture, b.fixture);
    assert_eq!(sim.deletions().len(), 2);
}

// ============== Binary tests ==============

/// Isolated config and data directories for one binary invocation
struct TestContext {
    dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let ctx = Self { dir };
        std::fs::write(
            ctx.config_path(),
            format!(
                "[artifacts]\ndir = {:?}\n\n[timeouts]\nelement_secs = 1\n",
                ctx.path().join("artifacts")
            ),
        )
        .expect("Failed to write config");
        ctx
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    fn run(&self, args: &[&str]) -> CliOutput {
        let output = Command::new(env!("CARGO_BIN_EXE_dashboard-e2e"))
            .arg("--config")
            .arg(self.config_path())
            .args(args)
            .env("XDG_CONFIG_HOME", self.path().join("xdg-config"))
            .env("XDG_DATA_HOME", self.path().join("xdg-data"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run dashboard-e2e");

        CliOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        }
    }

    fn write_scenario(&self, name: &str, content: &str) -> String {
        let path = self.path().join(name);
        std::fs::write(&path, content).expect("Failed to write scenario");
        path.to_string_lossy().to_string()
    }
}

#[derive(Debug)]
struct CliOutput {
    stdout: String,
    stderr: String,
    success: bool,
}

#[test]
fn test_cli_run_simulated_builtin() {
    let ctx = TestContext::new();
    let output = ctx.run(&["run", "--simulate", BUILTIN]);
    assert!(output.success, "{output:#?}");
    assert!(output.stdout.contains("Scenario Passed"), "{}", output.stdout);
}

#[test]
fn test_cli_run_json_report() {
    let ctx = TestContext::new();
    let output = ctx.run(&["run", "--simulate", "--json", "--case", "check_ssh_tab", BUILTIN]);
    assert!(output.success, "{output:#?}");

    let reports: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    let report = &reports[0];
    assert_eq!(report["name"], "workspace-details");
    assert_eq!(report["setup"]["status"], "passed");
    assert_eq!(report["teardown"]["status"], "deleted");
    assert_eq!(report["cases"][2]["outcome"]["status"], "passed");
    assert_eq!(report["cases"][0]["outcome"]["status"], "skipped");
}

#[test]
fn test_cli_failing_scenario_exits_non_zero() {
    let ctx = TestContext::new();
    let path = ctx.write_scenario(
        "failing.yaml",
        r#"
name: failing
cases:
  - name: no_dashboard_open
    steps:
      - action: select_tab
        tab: servers
"#,
    );
    let output = ctx.run(&["run", "--simulate", &path]);
    assert!(!output.success);
    assert!(output.stdout.contains("Scenario Failed"), "{}", output.stdout);
}

#[test]
fn test_cli_failing_run_flushes_log_file() {
    let ctx = TestContext::new();
    let path = ctx.write_scenario(
        "failing.yaml",
        r#"
name: failing
cases:
  - name: no_dashboard_open
    steps:
      - action: select_tab
        tab: servers
"#,
    );
    let output = ctx.run(&["--log-file", "run", "--simulate", &path]);
    assert!(!output.success);

    let log = ctx
        .path()
        .join("xdg-data/dashboard-e2e/logs/dashboard-e2e.log");
    let content = std::fs::read_to_string(&log).expect("Log file missing");
    assert!(content.contains("Case failed"), "{content}");
}

#[test]
fn test_cli_list_and_validate() {
    let ctx = TestContext::new();
    let output = ctx.run(&["list"]);
    assert!(output.success, "{output:#?}");
    for case in ["check_overview_tab", "check_working_with_servers", "check_ssh_tab", "check_volumes_tab"] {
        assert!(output.stdout.contains(case), "missing {case}: {}", output.stdout);
    }

    let bad = ctx.write_scenario(
        "bad.yaml",
        "name: bad\ncases:\n  - name: a\n    steps:\n      - action: select_workspace\n        name: ${project}\n",
    );
    let output = ctx.run(&["validate", BUILTIN, &bad]);
    assert!(!output.success);
    assert!(output.stdout.contains("project"), "{}", output.stdout);
}

#[test]
fn test_cli_unknown_case_is_an_error() {
    let ctx = TestContext::new();
    let output = ctx.run(&["run", "--simulate", "--case", "nope", BUILTIN]);
    assert!(!output.success);
    assert!(output.stderr.contains("nope"), "{}", output.stderr);
}
