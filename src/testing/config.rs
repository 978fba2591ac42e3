//! Scenario configuration types
//!
//! Defines the data structures for deserializing YAML scenarios, the
//! `${...}` substitution of fixture values into step fields and scenario
//! loading (files or the built-in scenarios).

use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::common::{Error, Result};
use crate::pageobject::{DialogButton, NavigationItem, WorkspaceDetailsTab};
use crate::workspace::FixtureSpec;

/// Prefix addressing scenarios compiled into the binary
pub const BUILTIN_PREFIX: &str = "builtin:";

/// Scenarios shipped with the binary
pub const BUILTIN_SCENARIOS: &[(&str, &str)] = &[(
    "builtin:workspace-details",
    include_str!("../../scenarios/workspace_details.yaml"),
)];

/// Default notification shown after a successful save
pub const DEFAULT_SAVE_NOTIFICATION: &str = "Workspace updated";

/// A complete scenario loaded from YAML
#[derive(Deserialize, Debug, Clone)]
pub struct Scenario {
    /// Name of the scenario
    pub name: String,
    /// Optional description of what the scenario verifies
    pub description: Option<String>,
    /// How the fixture workspace is created
    #[serde(default)]
    pub fixture: FixtureSpec,
    /// Steps run once before the cases
    #[serde(default)]
    pub setup: Vec<Step>,
    /// Test cases, run in declared order
    pub cases: Vec<TestCase>,
    /// UI steps run after the cases, before the fixture is deleted
    #[serde(default)]
    pub teardown: Vec<Step>,
}

/// A named sequence of steps
#[derive(Deserialize, Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<Step>,
}

/// A single step in the execution flow
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Open the dashboard root URL
    OpenDashboard,
    /// Click an item of the left navigation bar
    SelectNavigation { item: NavigationItem },
    /// Wait until the toolbar shows the given title
    WaitToolbarTitle { title: String },
    /// Click a workspace in the workspaces list
    SelectWorkspace { name: String },
    /// Select a tab of the workspace details page
    SelectTab { tab: WorkspaceDetailsTab },
    /// Click a button of the open dialog
    ClickDialogButton { button: DialogButton },
    /// Save pending changes and wait for the notification to come and go
    SaveChanges { notification: Option<String> },
    WaitNotification { message: String },
    WaitNotificationClosed,
    AssertWorkspaceName { name: String },
    AssertDeleteWorkspaceButton,
    /// Open the export panel, check its controls and hide it again
    ExportWorkspace,
    AddServer {
        reference: String,
        #[serde(deserialize_with = "port_string")]
        port: String,
        protocol: String,
    },
    EditServer {
        reference: String,
        new_reference: Option<String>,
        #[serde(default, deserialize_with = "optional_port_string")]
        port: Option<String>,
        protocol: Option<String>,
    },
    DeleteServer { reference: String },
    AssertServer {
        reference: String,
        #[serde(deserialize_with = "port_string")]
        port: String,
        #[serde(default = "default_true")]
        exists: bool,
    },
    /// Both SSH key fields are shown (`present: true`) or both are gone
    AssertSshKeys { present: bool },
    RemoveDefaultSshKey,
    GenerateSshKey,
    AddVolume { name: String, path: String },
    EditVolume {
        name: String,
        new_name: Option<String>,
        new_path: Option<String>,
    },
    RemoveVolume { name: String },
    AssertVolume {
        name: String,
        path: Option<String>,
        #[serde(default = "default_true")]
        exists: bool,
    },
}

fn default_true() -> bool {
    true
}

/// Ports may be written as YAML numbers or strings
#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u64),
    Text(String),
}

impl From<PortValue> for String {
    fn from(value: PortValue) -> Self {
        match value {
            PortValue::Number(n) => n.to_string(),
            PortValue::Text(s) => s,
        }
    }
}

fn port_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    PortValue::deserialize(deserializer).map(String::from)
}

fn optional_port_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<PortValue>::deserialize(deserializer)?.map(String::from))
}

/// Values of the running fixture, substituted for `${workspace}` and `${user}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureContext {
    pub workspace: String,
    pub user: String,
}

impl FixtureContext {
    pub fn new(workspace: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            user: user.into(),
        }
    }

    fn lookup(&self, variable: &str) -> Option<&str> {
        match variable {
            "workspace" => Some(&self.workspace),
            "user" => Some(&self.user),
            _ => None,
        }
    }

    /// Replace every `${name}` in `template`; unknown names are an error
    pub fn interpolate(&self, template: &str) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| {
                Error::Config(format!("Unterminated variable in '{}'", template))
            })?;
            let variable = &after[..end];
            let value = self.lookup(variable).ok_or_else(|| {
                Error::Config(format!(
                    "Unknown variable '${{{}}}' in '{}' (expected workspace or user)",
                    variable, template
                ))
            })?;
            out.push_str(value);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    fn interpolate_opt(&self, template: &Option<String>) -> Result<Option<String>> {
        template.as_deref().map(|t| self.interpolate(t)).transpose()
    }
}

impl Step {
    /// Copy of the step with fixture values substituted into every string field
    pub fn resolve(&self, ctx: &FixtureContext) -> Result<Step> {
        let s = |v: &String| ctx.interpolate(v);
        Ok(match self {
            Step::WaitToolbarTitle { title } => Step::WaitToolbarTitle { title: s(title)? },
            Step::SelectWorkspace { name } => Step::SelectWorkspace { name: s(name)? },
            Step::SaveChanges { notification } => Step::SaveChanges {
                notification: ctx.interpolate_opt(notification)?,
            },
            Step::WaitNotification { message } => Step::WaitNotification {
                message: s(message)?,
            },
            Step::AssertWorkspaceName { name } => Step::AssertWorkspaceName { name: s(name)? },
            Step::AddServer {
                reference,
                port,
                protocol,
            } => Step::AddServer {
                reference: s(reference)?,
                port: s(port)?,
                protocol: s(protocol)?,
            },
            Step::EditServer {
                reference,
                new_reference,
                port,
                protocol,
            } => Step::EditServer {
                reference: s(reference)?,
                new_reference: ctx.interpolate_opt(new_reference)?,
                port: ctx.interpolate_opt(port)?,
                protocol: ctx.interpolate_opt(protocol)?,
            },
            Step::DeleteServer { reference } => Step::DeleteServer {
                reference: s(reference)?,
            },
            Step::AssertServer {
                reference,
                port,
                exists,
            } => Step::AssertServer {
                reference: s(reference)?,
                port: s(port)?,
                exists: *exists,
            },
            Step::AddVolume { name, path } => Step::AddVolume {
                name: s(name)?,
                path: s(path)?,
            },
            Step::EditVolume {
                name,
                new_name,
                new_path,
            } => Step::EditVolume {
                name: s(name)?,
                new_name: ctx.interpolate_opt(new_name)?,
                new_path: ctx.interpolate_opt(new_path)?,
            },
            Step::RemoveVolume { name } => Step::RemoveVolume { name: s(name)? },
            Step::AssertVolume { name, path, exists } => Step::AssertVolume {
                name: s(name)?,
                path: ctx.interpolate_opt(path)?,
                exists: *exists,
            },
            Step::OpenDashboard
            | Step::SelectNavigation { .. }
            | Step::SelectTab { .. }
            | Step::ClickDialogButton { .. }
            | Step::WaitNotificationClosed
            | Step::AssertDeleteWorkspaceButton
            | Step::ExportWorkspace
            | Step::AssertSshKeys { .. }
            | Step::RemoveDefaultSshKey
            | Step::GenerateSshKey => self.clone(),
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::OpenDashboard => write!(f, "open dashboard"),
            Step::SelectNavigation { item } => write!(f, "select navigation '{}'", item),
            Step::WaitToolbarTitle { title } => write!(f, "wait toolbar title '{}'", title),
            Step::SelectWorkspace { name } => write!(f, "select workspace '{}'", name),
            Step::SelectTab { tab } => write!(f, "select tab '{}'", tab),
            Step::ClickDialogButton { button } => write!(f, "click '{}'", button),
            Step::SaveChanges { .. } => write!(f, "save changes"),
            Step::WaitNotification { message } => write!(f, "wait notification '{}'", message),
            Step::WaitNotificationClosed => write!(f, "wait notification closed"),
            Step::AssertWorkspaceName { name } => write!(f, "assert workspace name '{}'", name),
            Step::AssertDeleteWorkspaceButton => write!(f, "assert delete workspace button"),
            Step::ExportWorkspace => write!(f, "export workspace"),
            Step::AddServer {
                reference,
                port,
                protocol,
            } => write!(f, "add server {} {}/{}", reference, port, protocol),
            Step::EditServer { reference, .. } => write!(f, "edit server {}", reference),
            Step::DeleteServer { reference } => write!(f, "delete server {}", reference),
            Step::AssertServer {
                reference,
                port,
                exists,
            } => {
                let verb = if *exists { "listed" } else { "absent" };
                write!(f, "assert server {}:{} {}", reference, port, verb)
            }
            Step::AssertSshKeys { present } => {
                let verb = if *present { "present" } else { "absent" };
                write!(f, "assert ssh keys {}", verb)
            }
            Step::RemoveDefaultSshKey => write!(f, "remove default ssh key"),
            Step::GenerateSshKey => write!(f, "generate ssh key"),
            Step::AddVolume { name, path } => write!(f, "add volume {} at {}", name, path),
            Step::EditVolume { name, .. } => write!(f, "edit volume {}", name),
            Step::RemoveVolume { name } => write!(f, "remove volume {}", name),
            Step::AssertVolume { name, exists, .. } => {
                let verb = if *exists { "listed" } else { "absent" };
                write!(f, "assert volume {} {}", name, verb)
            }
        }
    }
}

impl Scenario {
    /// Load a scenario from a file path or a `builtin:` name
    pub fn load(source: &str) -> Result<Self> {
        if source.starts_with(BUILTIN_PREFIX) {
            let (_, content) = BUILTIN_SCENARIOS
                .iter()
                .find(|(name, _)| *name == source)
                .ok_or_else(|| {
                    let known: Vec<&str> = BUILTIN_SCENARIOS.iter().map(|(n, _)| *n).collect();
                    Error::scenario_parse(
                        source,
                        format!("unknown built-in scenario (available: {})", known.join(", ")),
                    )
                })?;
            return Self::parse(content, source);
        }

        let path = Path::new(source);
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content, source)
    }

    /// Parse and validate scenario YAML; `origin` names the source in errors
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(content)
            .map_err(|e| Error::scenario_parse(origin, e.to_string()))?;
        scenario
            .validate()
            .map_err(|e| Error::scenario_parse(origin, e.to_string()))?;
        Ok(scenario)
    }

    /// Check names and that every step only references known variables
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("scenario name is empty".to_string()));
        }
        if self.cases.is_empty() {
            return Err(Error::Config("scenario has no cases".to_string()));
        }

        let mut seen = HashSet::new();
        for case in &self.cases {
            if case.name.trim().is_empty() {
                return Err(Error::Config("case name is empty".to_string()));
            }
            if !seen.insert(case.name.as_str()) {
                return Err(Error::Config(format!("duplicate case '{}'", case.name)));
            }
            if case.steps.is_empty() {
                return Err(Error::Config(format!("case '{}' has no steps", case.name)));
            }
        }

        let probe = FixtureContext::new("workspace", "user");
        for step in self.all_steps() {
            step.resolve(&probe)?;
        }
        Ok(())
    }

    fn all_steps(&self) -> impl Iterator<Item = &Step> {
        self.setup
            .iter()
            .chain(self.cases.iter().flat_map(|c| c.steps.iter()))
            .chain(self.teardown.iter())
    }

    pub fn case_names(&self) -> Vec<&str> {
        self.cases.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name: minimal
setup:
  - action: open_dashboard
  - action: select_navigation
    item: workspaces
  - action: select_workspace
    name: ${workspace}
cases:
  - name: servers
    steps:
      - action: select_tab
        tab: servers
      - action: add_server
        reference: agen
        port: 8083
        protocol: https
      - action: edit_server
        reference: agen
        port: "83"
      - action: assert_server
        reference: agen
        port: 83
        exists: false
"#;

    #[test]
    fn test_parse_minimal_scenario() {
        let scenario = Scenario::parse(MINIMAL, "minimal.yaml").unwrap();
        assert_eq!(scenario.name, "minimal");
        assert_eq!(scenario.setup.len(), 3);
        assert!(scenario.teardown.is_empty());
        assert_eq!(scenario.fixture.name_prefix, "wksp-");
        assert_eq!(
            scenario.cases[0].steps[1],
            Step::AddServer {
                reference: "agen".into(),
                port: "8083".into(),
                protocol: "https".into(),
            }
        );
        assert_eq!(
            scenario.cases[0].steps[2],
            Step::EditServer {
                reference: "agen".into(),
                new_reference: None,
                port: Some("83".into()),
                protocol: None,
            }
        );
    }

    #[test]
    fn test_interpolation() {
        let ctx = FixtureContext::new("wksp-abc123", "che");
        assert_eq!(
            ctx.interpolate("${user}/${workspace}").unwrap(),
            "che/wksp-abc123"
        );
        assert_eq!(ctx.interpolate("plain").unwrap(), "plain");
        assert!(ctx.interpolate("${project}").is_err());
        assert!(ctx.interpolate("${workspace").is_err());
    }

    #[test]
    fn test_resolve_substitutes_fixture_name() {
        let ctx = FixtureContext::new("wksp-abc123", "che");
        let step = Step::WaitToolbarTitle {
            title: "${workspace}".into(),
        };
        assert_eq!(
            step.resolve(&ctx).unwrap(),
            Step::WaitToolbarTitle {
                title: "wksp-abc123".into()
            }
        );
    }

    #[test]
    fn test_unknown_variable_fails_validation() {
        let yaml = MINIMAL.replace("${workspace}", "${project}");
        let err = Scenario::parse(&yaml, "bad.yaml").unwrap_err();
        assert!(err.to_string().contains("project"));
    }

    #[test]
    fn test_duplicate_cases_rejected() {
        let yaml = r#"
name: dup
cases:
  - name: a
    steps: [{action: open_dashboard}]
  - name: a
    steps: [{action: open_dashboard}]
"#;
        let err = Scenario::parse(yaml, "dup.yaml").unwrap_err();
        assert!(err.to_string().contains("duplicate case"));
    }

    #[test]
    fn test_unknown_action_rejected() {
        let yaml = r#"
name: bad
cases:
  - name: a
    steps: [{action: fly_away}]
"#;
        assert!(matches!(
            Scenario::parse(yaml, "bad.yaml"),
            Err(Error::ScenarioParse { .. })
        ));
    }

    #[test]
    fn test_builtin_scenario_loads() {
        let scenario = Scenario::load("builtin:workspace-details").unwrap();
        assert_eq!(
            scenario.case_names(),
            vec![
                "check_overview_tab",
                "check_working_with_servers",
                "check_ssh_tab",
                "check_volumes_tab"
            ]
        );
        assert!(Scenario::load("builtin:nope").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Scenario::load("/nonexistent/scenario.yaml"),
            Err(Error::FileRead { .. })
        ));
    }
}
