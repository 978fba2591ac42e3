//! Workspace REST payloads

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::FixtureSpec;

/// Name of the single environment in fixture workspaces
pub const DEFAULT_ENV: &str = "default";

/// Runtime status reported by the workspace API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceStatus {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// The parts of a workspace description the client reads
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceDto {
    pub id: String,
    #[serde(default)]
    pub namespace: String,
    pub status: WorkspaceStatus,
    #[serde(default)]
    pub config: WorkspaceConfigDto,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceConfigDto {
    #[serde(default)]
    pub name: String,
}

/// Error body returned by the API on failure
#[derive(Debug, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub message: String,
}

/// Single-machine workspace config for `POST /workspace`
pub fn workspace_config(name: &str, spec: &FixtureSpec) -> Value {
    let memory_bytes = u64::from(spec.memory_gb) * 1024 * 1024 * 1024;
    json!({
        "name": name,
        "defaultEnv": DEFAULT_ENV,
        "projects": [],
        "commands": [],
        "environments": {
            "default": {
                "recipe": {
                    "type": "dockerimage",
                    "content": spec.image,
                },
                "machines": {
                    "dev-machine": {
                        "attributes": { "memoryLimitBytes": memory_bytes.to_string() },
                        "servers": {},
                        "installers": [
                            "org.eclipse.che.exec",
                            "org.eclipse.che.terminal",
                            "org.eclipse.che.ws-agent",
                        ],
                    }
                }
            }
        }
    })
}
