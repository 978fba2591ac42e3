use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::common::{Error, Result};
use crate::workspace::{FixtureSpec, TestWorkspace, WorkspaceService};

use super::Backend;

/// Fixture service writing straight into the simulated backend
pub struct SimulatedWorkspaceService {
    backend: Arc<Mutex<Backend>>,
}

impl SimulatedWorkspaceService {
    pub(super) fn new(backend: Arc<Mutex<Backend>>) -> Self {
        Self { backend }
    }

    fn backend(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl WorkspaceService for SimulatedWorkspaceService {
    async fn create(&self, spec: &FixtureSpec, user: &str) -> Result<TestWorkspace> {
        let mut backend = self.backend();
        if let Some(message) = &backend.create_failure {
            return Err(Error::workspace_api("create workspace", message.clone()));
        }

        let mut name = spec.generate_name();
        while backend.workspaces.contains_key(&name) {
            name = spec.generate_name();
        }
        let model = backend.insert_workspace(&name, user, spec.start_after_creation);
        tracing::debug!(workspace = %name, "Simulated fixture created");

        Ok(TestWorkspace {
            id: model.id,
            name,
            owner: user.to_string(),
        })
    }

    async fn delete(&self, name: &str, _user: &str) -> Result<()> {
        let mut backend = self.backend();
        backend.deletions.push(name.to_string());
        if let Some(message) = &backend.delete_failure {
            return Err(Error::workspace_api("delete workspace", message.clone()));
        }
        backend.workspaces.remove(name);
        backend.ssh_keys.remove(name);
        Ok(())
    }
}
