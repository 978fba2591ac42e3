//! REST client for the workspace API

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::common::config::Config;
use crate::common::{join_url, Error, Result};

use super::types::{workspace_config, ServiceError, WorkspaceDto, WorkspaceStatus};
use super::{FixtureSpec, TestWorkspace, WorkspaceService};

/// Workspace service backed by the dashboard's REST API
pub struct RestWorkspaceService {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
    stop_timeout: Duration,
    poll_interval: Duration,
}

impl RestWorkspaceService {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.workspace_api.url.clone(),
            token: config.workspace_api.token.clone(),
            stop_timeout: Duration::from_secs(config.timeouts.workspace_stop_secs),
            poll_interval: config.timeouts.poll_interval(),
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.api_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request, turning transport failures and error statuses into API errors
    async fn send(&self, name: &str, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| Error::workspace_api(name, e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = match response.json::<ServiceError>().await {
            Ok(body) if !body.message.is_empty() => body.message,
            _ => status.to_string(),
        };
        Err(Error::workspace_api(
            name,
            format!("{} ({})", message, status.as_u16()),
        ))
    }

    /// Look a workspace up by owner and name; None if it doesn't exist
    async fn find(&self, name: &str, user: &str) -> Result<Option<WorkspaceDto>> {
        let request = self.http.get(self.url(&format!("workspace/{}/{}", user, name)));
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| Error::workspace_api("get workspace", e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::workspace_api(
                "get workspace",
                response.status().to_string(),
            ));
        }

        let dto = response
            .json::<WorkspaceDto>()
            .await
            .map_err(|e| Error::workspace_api("get workspace", e.to_string()))?;
        Ok(Some(dto))
    }

    async fn start(&self, id: &str) -> Result<()> {
        self.send(
            "start workspace",
            self.http.post(self.url(&format!("workspace/{}/runtime", id))),
        )
        .await?;
        Ok(())
    }

    /// Stop a workspace and wait until the API reports it stopped
    ///
    /// Returns false if the workspace disappeared while stopping.
    async fn stop(&self, workspace: &WorkspaceDto, name: &str, user: &str) -> Result<bool> {
        if workspace.status != WorkspaceStatus::Stopping {
            self.send(
                "stop workspace",
                self.http
                    .delete(self.url(&format!("workspace/{}/runtime", workspace.id))),
            )
            .await?;
        }

        let deadline = Instant::now() + self.stop_timeout;
        loop {
            match self.find(name, user).await? {
                None => return Ok(false),
                Some(ws) if ws.status == WorkspaceStatus::Stopped => return Ok(true),
                Some(ws) => tracing::debug!(workspace = name, status = ?ws.status, "Waiting for workspace to stop"),
            }
            if Instant::now() >= deadline {
                return Err(Error::wait_timeout(
                    format!("workspace '{}' to stop", name),
                    self.stop_timeout.as_secs(),
                ));
            }
            sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl WorkspaceService for RestWorkspaceService {
    async fn create(&self, spec: &FixtureSpec, user: &str) -> Result<TestWorkspace> {
        let name = spec.generate_name();
        tracing::info!(workspace = %name, user, "Creating fixture workspace");

        let response = self
            .send(
                "create workspace",
                self.http
                    .post(self.url("workspace"))
                    .query(&[("namespace", user)])
                    .json(&workspace_config(&name, spec)),
            )
            .await?;
        let dto = response
            .json::<WorkspaceDto>()
            .await
            .map_err(|e| Error::workspace_api("create workspace", e.to_string()))?;

        if spec.start_after_creation {
            if let Err(e) = self.start(&dto.id).await {
                tracing::warn!(workspace = %name, "Start failed, removing created workspace: {}", e);
                if let Err(cleanup) = self.delete(&name, user).await {
                    tracing::error!(workspace = %name, "Could not remove workspace: {}", cleanup);
                }
                return Err(e);
            }
        }

        Ok(TestWorkspace {
            id: dto.id,
            name,
            owner: user.to_string(),
        })
    }

    async fn delete(&self, name: &str, user: &str) -> Result<()> {
        let Some(workspace) = self.find(name, user).await? else {
            tracing::info!(workspace = name, "Workspace already gone");
            return Ok(());
        };

        if workspace.status != WorkspaceStatus::Stopped {
            let stopped = self.stop(&workspace, name, user).await?;
            if !stopped {
                tracing::info!(workspace = name, "Workspace removed while stopping");
                return Ok(());
            }
        }

        self.send(
            "delete workspace",
            self.http
                .delete(self.url(&format!("workspace/{}", workspace.id))),
        )
        .await?;

        tracing::info!(workspace = name, "Fixture workspace deleted");
        Ok(())
    }
}
