//! Error types for the scenario runner
//!
//! Messages name the UI element or API call that failed so a scenario
//! report is readable without the log file.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scenario runner
#[derive(Error, Debug)]
pub enum Error {
    // === WebDriver Errors ===
    #[error("WebDriver request failed: {0}")]
    WebDriverTransport(#[source] reqwest::Error),

    #[error("WebDriver error '{error}': {message}")]
    WebDriver { error: String, message: String },

    #[error("No browser session. Is the WebDriver server running at {0}?")]
    SessionNotCreated(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Stale element reference: {0}")]
    StaleElement(String),

    // === Wait/Assertion Errors ===
    #[error("Timed out after {secs} seconds waiting for {what}")]
    WaitTimeout { what: String, secs: u64 },

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Saving workspace changes failed: {0}")]
    SaveFailed(String),

    // === Workspace API Errors ===
    #[error("Workspace API request '{request}' failed: {message}")]
    WorkspaceApi { request: String, message: String },

    #[error("Workspace '{0}' not found")]
    WorkspaceNotFound(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid scenario '{path}': {message}")]
    ScenarioParse { path: String, message: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::WebDriverTransport(e)
    }
}

impl Error {
    /// Create a wait timeout error
    pub fn wait_timeout(what: impl Into<String>, secs: u64) -> Self {
        Self::WaitTimeout {
            what: what.into(),
            secs,
        }
    }

    /// Create a workspace API error
    pub fn workspace_api(request: &str, message: impl Into<String>) -> Self {
        Self::WorkspaceApi {
            request: request.to_string(),
            message: message.into(),
        }
    }

    /// Create a scenario parse error
    pub fn scenario_parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ScenarioParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Map a W3C WebDriver error code to a typed error
    pub fn from_webdriver(error: &str, message: &str) -> Self {
        match error {
            "no such element" => Self::ElementNotFound(message.to_string()),
            "stale element reference" => Self::StaleElement(message.to_string()),
            "session not created" | "invalid session id" => {
                Self::SessionNotCreated(message.to_string())
            }
            _ => Self::WebDriver {
                error: error.to_string(),
                message: message.to_string(),
            },
        }
    }

    /// Whether the error is a failed expectation on UI state, as opposed to
    /// infrastructure trouble (browser, network, backend)
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            Error::Assertion(_)
                | Error::SaveFailed(_)
                | Error::WaitTimeout { .. }
                | Error::ElementNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webdriver_error_codes_map_to_variants() {
        assert!(matches!(
            Error::from_webdriver("no such element", "//button"),
            Error::ElementNotFound(_)
        ));
        assert!(matches!(
            Error::from_webdriver("stale element reference", "gone"),
            Error::StaleElement(_)
        ));
        assert!(matches!(
            Error::from_webdriver("invalid session id", "closed"),
            Error::SessionNotCreated(_)
        ));
        match Error::from_webdriver("element click intercepted", "overlay") {
            Error::WebDriver { error, message } => {
                assert_eq!(error, "element click intercepted");
                assert_eq!(message, "overlay");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_assertion_classification() {
        assert!(Error::Assertion("x".into()).is_assertion());
        assert!(Error::SaveFailed("x".into()).is_assertion());
        assert!(Error::wait_timeout("title", 5).is_assertion());
        assert!(!Error::workspace_api("delete", "500").is_assertion());
        assert!(!Error::Config("bad".into()).is_assertion());
    }

    #[test]
    fn test_wait_timeout_message() {
        let e = Error::wait_timeout("notification 'Workspace updated'", 20);
        assert_eq!(
            e.to_string(),
            "Timed out after 20 seconds waiting for notification 'Workspace updated'"
        );
    }
}
