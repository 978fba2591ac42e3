//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Dashboard under test
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Remote WebDriver endpoint
    #[serde(default)]
    pub webdriver: WebDriverConfig,

    /// Workspace REST API used for fixtures
    #[serde(default)]
    pub workspace_api: WorkspaceApiConfig,

    /// Identity the scenarios run as
    #[serde(default)]
    pub user: UserConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Failure artifacts
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
}

/// Dashboard settings
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Root URL of the dashboard (e.g. `http://localhost:8080/dashboard/`)
    #[serde(default = "default_dashboard_url")]
    pub url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            url: default_dashboard_url(),
        }
    }
}

fn default_dashboard_url() -> String {
    "http://localhost:8080/dashboard/".to_string()
}

/// Browser kind requested from the WebDriver server
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

impl BrowserKind {
    /// W3C `browserName` capability value
    pub fn capability_name(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
        }
    }
}

/// WebDriver settings
#[derive(Debug, Deserialize, Clone)]
pub struct WebDriverConfig {
    /// WebDriver server URL (chromedriver, geckodriver or a Selenium grid)
    #[serde(default = "default_webdriver_url")]
    pub url: String,

    #[serde(default)]
    pub browser: BrowserKind,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            browser: BrowserKind::default(),
            headless: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}
fn default_true() -> bool {
    true
}
fn default_window_width() -> u32 {
    1920
}
fn default_window_height() -> u32 {
    1080
}

/// Workspace REST API settings
#[derive(Debug, Deserialize, Clone)]
pub struct WorkspaceApiConfig {
    /// API root (e.g. `http://localhost:8080/api`)
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Bearer token, if the server requires authentication
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for WorkspaceApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            token: None,
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:8080/api".to_string()
}

/// Test user settings
#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    #[serde(default = "default_user")]
    pub name: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            name: default_user(),
        }
    }
}

fn default_user() -> String {
    "che".to_string()
}

/// Timeout settings
#[derive(Debug, Deserialize, Clone)]
pub struct Timeouts {
    /// Wait for an element to become present/actionable
    #[serde(default = "default_element")]
    pub element_secs: u64,

    /// Wait for a notification to appear or close
    #[serde(default = "default_notification")]
    pub notification_secs: u64,

    /// Wait for a page navigation to finish
    #[serde(default = "default_page_load")]
    pub page_load_secs: u64,

    /// Poll interval used by every wait
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Wait for a running workspace to stop before deletion
    #[serde(default = "default_workspace_stop")]
    pub workspace_stop_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_secs: default_element(),
            notification_secs: default_notification(),
            page_load_secs: default_page_load(),
            poll_interval_ms: default_poll_interval(),
            workspace_stop_secs: default_workspace_stop(),
        }
    }
}

impl Timeouts {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_element() -> u64 {
    10
}
fn default_notification() -> u64 {
    20
}
fn default_page_load() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    250
}
fn default_workspace_stop() -> u64 {
    120
}

/// Failure artifact settings
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ArtifactsConfig {
    /// Screenshot directory; falls back to the per-user data directory
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Disable screenshots on failure
    #[serde(default)]
    pub disabled: bool,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from an explicit path; the file must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// Apply `DASHBOARD_E2E_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DASHBOARD_E2E_URL") {
            self.dashboard.url = url;
        }
        if let Some(url) = lookup("DASHBOARD_E2E_WEBDRIVER") {
            self.webdriver.url = url;
        }
        if let Some(url) = lookup("DASHBOARD_E2E_API") {
            self.workspace_api.url = url;
        }
        if let Some(user) = lookup("DASHBOARD_E2E_USER") {
            self.user.name = user;
        }
        if let Some(token) = lookup("DASHBOARD_E2E_TOKEN") {
            self.workspace_api.token = Some(token);
        }
    }

    /// Directory screenshots are written to, or None if disabled
    pub fn screenshot_dir(&self) -> Option<PathBuf> {
        if self.artifacts.disabled {
            return None;
        }
        self.artifacts
            .dir
            .clone()
            .or_else(super::paths::artifacts_dir)
    }
}
