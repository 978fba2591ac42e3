//! Workspace fixtures
//!
//! A scenario's fixture is a freshly created workspace, deleted out-of-band
//! (through the REST API, not the UI) when the scenario ends.

mod client;
pub mod types;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;

use crate::common::Result;

pub use client::RestWorkspaceService;

/// Length of the random suffix appended to fixture names
const NAME_SUFFIX_LEN: usize = 6;

/// How a scenario's fixture workspace is created
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureSpec {
    /// Prefix of the generated workspace name
    #[serde(default = "default_prefix")]
    pub name_prefix: String,

    /// Docker image for the single dev machine
    #[serde(default = "default_image")]
    pub image: String,

    /// Memory limit of the dev machine in GiB
    #[serde(default = "default_memory_gb")]
    pub memory_gb: u32,

    /// Start the workspace right after it is created
    #[serde(default)]
    pub start_after_creation: bool,
}

impl Default for FixtureSpec {
    fn default() -> Self {
        Self {
            name_prefix: default_prefix(),
            image: default_image(),
            memory_gb: default_memory_gb(),
            start_after_creation: false,
        }
    }
}

fn default_prefix() -> String {
    "wksp-".to_string()
}
fn default_image() -> String {
    "eclipse/ubuntu_jdk8".to_string()
}
fn default_memory_gb() -> u32 {
    2
}

impl FixtureSpec {
    /// Generate a fresh workspace name: prefix plus random lowercase alphanumerics
    pub fn generate_name(&self) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NAME_SUFFIX_LEN)
            .map(|b| (b as char).to_ascii_lowercase())
            .collect();
        format!("{}{}", self.name_prefix, suffix)
    }
}

/// A fixture workspace that exists on the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestWorkspace {
    pub id: String,
    pub name: String,
    pub owner: String,
}

/// Out-of-band workspace management used for fixtures
#[async_trait]
pub trait WorkspaceService: Send + Sync {
    /// Create a workspace for `user` following `spec`
    async fn create(&self, spec: &FixtureSpec, user: &str) -> Result<TestWorkspace>;

    /// Delete a workspace, stopping it first if needed
    ///
    /// Deleting a workspace that no longer exists succeeds.
    async fn delete(&self, name: &str, user: &str) -> Result<()>;
}
