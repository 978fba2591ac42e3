use async_trait::async_trait;
use base64::Engine;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::common::config::Timeouts;
use crate::common::{Error, Result};
use crate::pageobject::{
    Dashboard, DialogButton, NavigationItem, OverviewTab, ServersTab, SshTab, VolumesTab,
    WorkspaceDetails, WorkspaceDetailsTab, WorkspaceList,
};

use super::{Backend, Server, SshKeyPair, Volume, WorkspaceModel};

/// 1x1 transparent PNG returned as the screenshot
const BLANK_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

const SAVED_MESSAGE: &str = "Workspace updated";
const SAVE_FAILED_MESSAGE: &str = "Failed to update workspace";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Page {
    Blank,
    Section(NavigationItem),
    Details { workspace: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Dialog {
    AddServer,
    EditServer { original: String },
    DeleteServer { reference: String },
    AddVolume,
    EditVolume { original: String },
    RemoveVolume { name: String },
}

#[derive(Debug, Default)]
struct Form {
    reference: String,
    port: String,
    protocol: String,
    volume_name: String,
    volume_path: String,
}

#[derive(Debug)]
struct Session {
    page: Page,
    tab: Option<WorkspaceDetailsTab>,
    dialog: Option<Dialog>,
    form: Form,
    draft: Option<WorkspaceModel>,
    notification: Option<String>,
    export_open: bool,
    closed: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            page: Page::Blank,
            tab: None,
            dialog: None,
            form: Form::default(),
            draft: None,
            notification: None,
            export_open: false,
            closed: false,
        }
    }
}

/// One browser session on the simulated dashboard
pub struct SimulatedDashboard {
    backend: Arc<Mutex<Backend>>,
    session: Mutex<Session>,
    timeouts: Timeouts,
}

impl SimulatedDashboard {
    pub(super) fn new(backend: Arc<Mutex<Backend>>, timeouts: Timeouts) -> Self {
        Self {
            backend,
            session: Mutex::new(Session::default()),
            timeouts,
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Backend and session, always locked in that order
    fn both(&self) -> (MutexGuard<'_, Backend>, MutexGuard<'_, Session>) {
        let backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);
        (backend, self.session())
    }

    fn element_timeout(&self, what: impl Into<String>) -> Error {
        Error::wait_timeout(what, self.timeouts.element_secs)
    }
}

fn not_found(what: impl Into<String>) -> Error {
    Error::ElementNotFound(what.into())
}

impl Session {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::SessionNotCreated("simulated session closed".to_string()));
        }
        Ok(())
    }

    /// The draft of the open workspace when `tab` is selected
    fn draft_on(&mut self, tab: WorkspaceDetailsTab) -> Result<&mut WorkspaceModel> {
        self.ensure_open()?;
        if self.tab != Some(tab) {
            return Err(not_found(format!("{} tab content", tab)));
        }
        self.draft
            .as_mut()
            .ok_or_else(|| not_found("workspace details"))
    }

    fn details_workspace(&self) -> Option<&str> {
        match &self.page {
            Page::Details { workspace } => Some(workspace),
            _ => None,
        }
    }

    fn close_dialog(&mut self) {
        self.dialog = None;
        self.form = Form::default();
    }
}

#[async_trait]
impl Dashboard for SimulatedDashboard {
    async fn open(&self) -> Result<()> {
        let mut session = self.session();
        session.ensure_open()?;
        session.page = Page::Section(NavigationItem::Dashboard);
        session.tab = None;
        session.draft = None;
        session.close_dialog();
        Ok(())
    }

    async fn select_navigation_item(&self, item: NavigationItem) -> Result<()> {
        let mut session = self.session();
        session.ensure_open()?;
        if session.page == Page::Blank {
            return Err(not_found(format!("navigation item '{}'", item)));
        }
        session.page = Page::Section(item);
        session.tab = None;
        session.draft = None;
        session.close_dialog();
        Ok(())
    }

    async fn wait_toolbar_title(&self, title: &str) -> Result<()> {
        let session = self.session();
        session.ensure_open()?;
        let current = match &session.page {
            Page::Blank => None,
            Page::Section(item) => Some(item.title().to_string()),
            Page::Details { workspace } => Some(workspace.clone()),
        };
        if current.as_deref() == Some(title) {
            Ok(())
        } else {
            Err(Error::wait_timeout(
                format!("toolbar title '{}' (showing {:?})", title, current),
                self.timeouts.page_load_secs,
            ))
        }
    }

    async fn wait_notification(&self, message: &str) -> Result<()> {
        let session = self.session();
        session.ensure_open()?;
        match &session.notification {
            Some(shown) if shown.contains(message) => Ok(()),
            shown => Err(Error::wait_timeout(
                format!("notification '{}' (showing {:?})", message, shown),
                self.timeouts.notification_secs,
            )),
        }
    }

    async fn wait_notification_closed(&self) -> Result<()> {
        let mut session = self.session();
        session.ensure_open()?;
        // Toasts dismiss themselves
        session.notification = None;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let session = self.session();
        session.ensure_open()?;
        base64::engine::general_purpose::STANDARD
            .decode(BLANK_PNG)
            .map_err(|e| Error::Internal(format!("Invalid screenshot encoding: {}", e)))
    }

    async fn close(&self) -> Result<()> {
        let (mut backend, mut session) = self.both();
        if !session.closed {
            session.closed = true;
            session.page = Page::Blank;
            backend.closed_sessions += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl WorkspaceList for SimulatedDashboard {
    async fn select_workspace(&self, name: &str) -> Result<()> {
        let (backend, mut session) = self.both();
        session.ensure_open()?;
        if session.page != Page::Section(NavigationItem::Workspaces) {
            return Err(not_found(format!("workspace '{}' in list", name)));
        }
        let workspace = backend
            .workspaces
            .get(name)
            .cloned()
            .ok_or_else(|| self.element_timeout(format!("workspace '{}' in list", name)))?;
        session.page = Page::Details {
            workspace: name.to_string(),
        };
        session.tab = Some(WorkspaceDetailsTab::Overview);
        session.draft = Some(workspace);
        session.export_open = false;
        Ok(())
    }
}

#[async_trait]
impl WorkspaceDetails for SimulatedDashboard {
    async fn select_tab(&self, tab: WorkspaceDetailsTab) -> Result<()> {
        let mut session = self.session();
        session.ensure_open()?;
        if session.details_workspace().is_none() {
            return Err(not_found(format!("tab '{}'", tab)));
        }
        session.tab = Some(tab);
        session.export_open = false;
        session.close_dialog();
        Ok(())
    }

    async fn click_dialog_button(&self, button: DialogButton) -> Result<()> {
        let mut session = self.session();
        session.ensure_open()?;
        let dialog = session
            .dialog
            .clone()
            .ok_or_else(|| not_found(format!("dialog button '{}'", button)))?;

        if matches!(button, DialogButton::Cancel | DialogButton::Close) {
            session.close_dialog();
            return Ok(());
        }

        let form = std::mem::take(&mut session.form);
        let draft = session
            .draft
            .as_mut()
            .ok_or_else(|| not_found("workspace details"))?;

        match (dialog, button) {
            (Dialog::AddServer, DialogButton::Add) => {
                if !valid_server(&form) || draft.servers.iter().any(|s| s.reference == form.reference) {
                    session.form = form;
                    return Err(self.element_timeout("enabled 'Add' button"));
                }
                draft.servers.push(Server {
                    reference: form.reference,
                    port: form.port,
                    protocol: form.protocol,
                });
            }
            (Dialog::EditServer { original }, DialogButton::Update) => {
                let taken = form.reference != original
                    && draft.servers.iter().any(|s| s.reference == form.reference);
                if !valid_server(&form) || taken {
                    session.form = form;
                    return Err(self.element_timeout("enabled 'Update' button"));
                }
                if let Some(server) = draft.servers.iter_mut().find(|s| s.reference == original) {
                    server.reference = form.reference;
                    server.port = form.port;
                    server.protocol = form.protocol;
                }
            }
            (Dialog::DeleteServer { reference }, DialogButton::Delete) => {
                draft.servers.retain(|s| s.reference != reference);
            }
            (Dialog::AddVolume, DialogButton::Add) => {
                if !valid_volume(&form) || draft.volumes.iter().any(|v| v.name == form.volume_name) {
                    session.form = form;
                    return Err(self.element_timeout("enabled 'Add' button"));
                }
                draft.volumes.push(Volume {
                    name: form.volume_name,
                    path: form.volume_path,
                });
            }
            (Dialog::EditVolume { original }, DialogButton::Update) => {
                let taken = form.volume_name != original
                    && draft.volumes.iter().any(|v| v.name == form.volume_name);
                if !valid_volume(&form) || taken {
                    session.form = form;
                    return Err(self.element_timeout("enabled 'Update' button"));
                }
                if let Some(volume) = draft.volumes.iter_mut().find(|v| v.name == original) {
                    volume.name = form.volume_name;
                    volume.path = form.volume_path;
                }
            }
            (Dialog::RemoveVolume { name }, DialogButton::Delete) => {
                draft.volumes.retain(|v| v.name != name);
            }
            (_, button) => {
                session.form = form;
                return Err(not_found(format!("dialog button '{}'", button)));
            }
        }

        session.dialog = None;
        Ok(())
    }

    async fn click_save_changes(&self) -> Result<()> {
        let (mut backend, mut session) = self.both();
        session.ensure_open()?;
        let workspace = session
            .details_workspace()
            .map(str::to_string)
            .ok_or_else(|| not_found("save button"))?;
        let Some(draft) = session.draft.clone() else {
            return Err(not_found("save button"));
        };
        // Any earlier toast is gone by the time the next save is attempted
        session.notification = None;

        let saved = backend
            .workspaces
            .get(&workspace)
            .ok_or_else(|| Error::WorkspaceNotFound(workspace.clone()))?;
        if *saved == draft {
            // The save bar is only shown with unsaved changes
            return Err(self.element_timeout("clickable save button"));
        }

        if backend.fail_saves {
            session.notification = Some(SAVE_FAILED_MESSAGE.to_string());
        } else {
            backend.workspaces.insert(workspace, draft);
            session.notification = Some(SAVED_MESSAGE.to_string());
        }
        Ok(())
    }
}

fn valid_server(form: &Form) -> bool {
    let port_ok = form
        .port
        .parse::<u16>()
        .map(|p| p > 0)
        .unwrap_or(false);
    !form.reference.trim().is_empty() && port_ok && !form.protocol.trim().is_empty()
}

fn valid_volume(form: &Form) -> bool {
    !form.volume_name.trim().is_empty() && form.volume_path.starts_with('/')
}

#[async_trait]
impl OverviewTab for SimulatedDashboard {
    async fn workspace_name(&self) -> Result<String> {
        let mut session = self.session();
        Ok(session.draft_on(WorkspaceDetailsTab::Overview)?.name.clone())
    }

    async fn delete_workspace_button_exists(&self) -> Result<bool> {
        let mut session = self.session();
        Ok(session.draft_on(WorkspaceDetailsTab::Overview).is_ok())
    }

    async fn click_export(&self) -> Result<()> {
        let mut session = self.session();
        session.draft_on(WorkspaceDetailsTab::Overview)?;
        session.export_open = true;
        Ok(())
    }

    async fn wait_export_controls(&self) -> Result<()> {
        let session = self.session();
        if session.export_open {
            Ok(())
        } else {
            Err(self.element_timeout("export clipboard and download buttons"))
        }
    }

    async fn hide_export(&self) -> Result<()> {
        let mut session = self.session();
        if !session.export_open {
            return Err(not_found("hide export button"));
        }
        session.export_open = false;
        Ok(())
    }
}

#[async_trait]
impl ServersTab for SimulatedDashboard {
    async fn click_add_server(&self) -> Result<()> {
        let mut session = self.session();
        session.draft_on(WorkspaceDetailsTab::Servers)?;
        session.form = Form::default();
        session.dialog = Some(Dialog::AddServer);
        Ok(())
    }

    async fn wait_add_server_dialog(&self) -> Result<()> {
        let session = self.session();
        if session.dialog == Some(Dialog::AddServer) {
            Ok(())
        } else {
            Err(self.element_timeout("'Add a new server' dialog"))
        }
    }

    async fn enter_reference(&self, reference: &str) -> Result<()> {
        let mut session = self.session();
        match session.dialog {
            Some(Dialog::AddServer) | Some(Dialog::EditServer { .. }) => {
                session.form.reference = reference.to_string();
                Ok(())
            }
            _ => Err(self.element_timeout("server reference input")),
        }
    }

    async fn enter_port(&self, port: &str) -> Result<()> {
        let mut session = self.session();
        match session.dialog {
            Some(Dialog::AddServer) | Some(Dialog::EditServer { .. }) => {
                session.form.port = port.to_string();
                Ok(())
            }
            _ => Err(self.element_timeout("server port input")),
        }
    }

    async fn enter_protocol(&self, protocol: &str) -> Result<()> {
        let mut session = self.session();
        match session.dialog {
            Some(Dialog::AddServer) | Some(Dialog::EditServer { .. }) => {
                session.form.protocol = protocol.to_string();
                Ok(())
            }
            _ => Err(self.element_timeout("server protocol input")),
        }
    }

    async fn click_edit_server(&self, reference: &str) -> Result<()> {
        let mut session = self.session();
        let server = session
            .draft_on(WorkspaceDetailsTab::Servers)?
            .servers
            .iter()
            .find(|s| s.reference == reference)
            .cloned()
            .ok_or_else(|| self.element_timeout(format!("edit button of server '{}'", reference)))?;
        session.form = Form {
            reference: server.reference,
            port: server.port,
            protocol: server.protocol,
            ..Form::default()
        };
        session.dialog = Some(Dialog::EditServer {
            original: reference.to_string(),
        });
        Ok(())
    }

    async fn click_delete_server(&self, reference: &str) -> Result<()> {
        let mut session = self.session();
        let listed = session
            .draft_on(WorkspaceDetailsTab::Servers)?
            .servers
            .iter()
            .any(|s| s.reference == reference);
        if !listed {
            return Err(self.element_timeout(format!("delete button of server '{}'", reference)));
        }
        session.dialog = Some(Dialog::DeleteServer {
            reference: reference.to_string(),
        });
        Ok(())
    }

    async fn server_exists(&self, reference: &str, port: &str) -> Result<bool> {
        let mut session = self.session();
        Ok(session
            .draft_on(WorkspaceDetailsTab::Servers)?
            .servers
            .iter()
            .any(|s| s.reference == reference && s.port == port))
    }

    async fn wait_server_absent(&self, reference: &str, port: &str) -> Result<()> {
        if self.server_exists(reference, port).await? {
            Err(self.element_timeout(format!(
                "server '{}' with port {} to disappear",
                reference, port
            )))
        } else {
            Ok(())
        }
    }
}

impl SimulatedDashboard {
    fn ssh_key(&self) -> Result<Option<SshKeyPair>> {
        let (backend, mut session) = self.both();
        let name = session.draft_on(WorkspaceDetailsTab::Ssh)?.name.clone();
        Ok(backend.ssh_keys.get(&name).cloned())
    }
}

#[async_trait]
impl SshTab for SimulatedDashboard {
    async fn private_key_exists(&self) -> Result<bool> {
        Ok(self
            .ssh_key()?
            .map(|k| !k.private_key.is_empty())
            .unwrap_or(false))
    }

    async fn public_key_exists(&self) -> Result<bool> {
        Ok(self
            .ssh_key()?
            .map(|k| !k.public_key.is_empty())
            .unwrap_or(false))
    }

    async fn click_remove_default_key(&self) -> Result<()> {
        let (mut backend, mut session) = self.both();
        let name = session.draft_on(WorkspaceDetailsTab::Ssh)?.name.clone();
        if backend.ssh_keys.remove(&name).is_none() {
            return Err(self.element_timeout("remove default SSH key button"));
        }
        Ok(())
    }

    async fn wait_ssh_key_absent(&self) -> Result<()> {
        if self.ssh_key()?.is_some() {
            Err(self.element_timeout("SSH key fields to disappear"))
        } else {
            Ok(())
        }
    }

    async fn click_generate_key(&self) -> Result<()> {
        let (mut backend, mut session) = self.both();
        let name = session.draft_on(WorkspaceDetailsTab::Ssh)?.name.clone();
        if backend.ssh_keys.contains_key(&name) {
            // The generate button is only offered when there is no key
            return Err(self.element_timeout("generate SSH key button"));
        }
        backend.ssh_keys.insert(name, SshKeyPair::generate());
        Ok(())
    }
}

#[async_trait]
impl VolumesTab for SimulatedDashboard {
    async fn click_add_volume(&self) -> Result<()> {
        let mut session = self.session();
        session.draft_on(WorkspaceDetailsTab::Volumes)?;
        session.form = Form::default();
        session.dialog = Some(Dialog::AddVolume);
        Ok(())
    }

    async fn enter_volume_name(&self, name: &str) -> Result<()> {
        let mut session = self.session();
        match session.dialog {
            Some(Dialog::AddVolume) | Some(Dialog::EditVolume { .. }) => {
                session.form.volume_name = name.to_string();
                Ok(())
            }
            _ => Err(self.element_timeout("volume name input")),
        }
    }

    async fn enter_volume_path(&self, path: &str) -> Result<()> {
        let mut session = self.session();
        match session.dialog {
            Some(Dialog::AddVolume) | Some(Dialog::EditVolume { .. }) => {
                session.form.volume_path = path.to_string();
                Ok(())
            }
            _ => Err(self.element_timeout("volume path input")),
        }
    }

    async fn click_edit_volume(&self, name: &str) -> Result<()> {
        let mut session = self.session();
        let volume = session
            .draft_on(WorkspaceDetailsTab::Volumes)?
            .volumes
            .iter()
            .find(|v| v.name == name)
            .cloned()
            .ok_or_else(|| self.element_timeout(format!("edit button of volume '{}'", name)))?;
        session.form = Form {
            volume_name: volume.name,
            volume_path: volume.path,
            ..Form::default()
        };
        session.dialog = Some(Dialog::EditVolume {
            original: name.to_string(),
        });
        Ok(())
    }

    async fn click_remove_volume(&self, name: &str) -> Result<()> {
        let mut session = self.session();
        let listed = session
            .draft_on(WorkspaceDetailsTab::Volumes)?
            .volumes
            .iter()
            .any(|v| v.name == name);
        if !listed {
            return Err(self.element_timeout(format!("remove button of volume '{}'", name)));
        }
        session.dialog = Some(Dialog::RemoveVolume {
            name: name.to_string(),
        });
        Ok(())
    }

    async fn volume_exists(&self, name: &str, path: Option<&str>) -> Result<bool> {
        let mut session = self.session();
        Ok(session
            .draft_on(WorkspaceDetailsTab::Volumes)?
            .volumes
            .iter()
            .any(|v| v.name == name && path.map_or(true, |p| v.path == p)))
    }

    async fn wait_volume_absent(&self, name: &str) -> Result<()> {
        if self.volume_exists(name, None).await? {
            Err(self.element_timeout(format!("volume '{}' to disappear", name)))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::Simulation;

    async fn on_tab(sim: &Simulation, tab: WorkspaceDetailsTab) -> SimulatedDashboard {
        sim.add_workspace("wksp-test", "che");
        let ui = sim.dashboard();
        ui.open().await.unwrap();
        ui.select_navigation_item(NavigationItem::Workspaces).await.unwrap();
        ui.select_workspace("wksp-test").await.unwrap();
        ui.select_tab(tab).await.unwrap();
        ui
    }

    async fn add_server(ui: &SimulatedDashboard, reference: &str, port: &str, protocol: &str) {
        ui.click_add_server().await.unwrap();
        ui.wait_add_server_dialog().await.unwrap();
        ui.enter_reference(reference).await.unwrap();
        ui.enter_port(port).await.unwrap();
        ui.enter_protocol(protocol).await.unwrap();
        ui.click_dialog_button(DialogButton::Add).await.unwrap();
    }

    #[tokio::test]
    async fn test_created_server_is_listed_once() {
        let sim = Simulation::new();
        let ui = on_tab(&sim, WorkspaceDetailsTab::Servers).await;

        add_server(&ui, "agen", "8083", "https").await;
        ui.click_save_changes().await.unwrap();
        ui.wait_notification("Workspace updated").await.unwrap();

        assert!(ui.server_exists("agen", "8083").await.unwrap());
        let saved = sim.workspace("wksp-test").unwrap();
        let matching: Vec<_> = saved
            .servers
            .iter()
            .filter(|s| s.reference == "agen" && s.port == "8083" && s.protocol == "https")
            .collect();
        assert_eq!(matching.len(), 1);
    }

    #[tokio::test]
    async fn test_edit_replaces_server() {
        let sim = Simulation::new();
        let ui = on_tab(&sim, WorkspaceDetailsTab::Servers).await;
        add_server(&ui, "agen", "8083", "https").await;

        ui.click_edit_server("agen").await.unwrap();
        ui.enter_reference("agent").await.unwrap();
        ui.enter_port("83").await.unwrap();
        ui.enter_protocol("http").await.unwrap();
        ui.click_dialog_button(DialogButton::Update).await.unwrap();

        assert!(!ui.server_exists("agen", "8083").await.unwrap());
        assert!(ui.server_exists("agent", "83").await.unwrap());
    }

    #[tokio::test]
    async fn test_add_disabled_for_invalid_port() {
        let sim = Simulation::new();
        let ui = on_tab(&sim, WorkspaceDetailsTab::Servers).await;
        ui.click_add_server().await.unwrap();
        ui.enter_reference("agent").await.unwrap();
        ui.enter_port("eighty").await.unwrap();
        ui.enter_protocol("http").await.unwrap();

        let err = ui.click_dialog_button(DialogButton::Add).await.unwrap_err();
        assert!(matches!(err, Error::WaitTimeout { .. }));
        assert!(!ui.server_exists("agent", "eighty").await.unwrap());
    }

    #[tokio::test]
    async fn test_save_without_changes_is_not_clickable() {
        let sim = Simulation::new();
        let ui = on_tab(&sim, WorkspaceDetailsTab::Volumes).await;
        let err = ui.click_save_changes().await.unwrap_err();
        assert!(matches!(err, Error::WaitTimeout { .. }));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_backend_unchanged() {
        let sim = Simulation::new();
        let ui = on_tab(&sim, WorkspaceDetailsTab::Volumes).await;
        sim.fail_saves(true);

        ui.click_add_volume().await.unwrap();
        ui.enter_volume_name("prj").await.unwrap();
        ui.enter_volume_path("/prj").await.unwrap();
        ui.click_dialog_button(DialogButton::Add).await.unwrap();
        ui.click_save_changes().await.unwrap();

        assert!(ui.wait_notification("Workspace updated").await.is_err());
        ui.wait_notification("Failed to update workspace").await.unwrap();
        assert!(sim.workspace("wksp-test").unwrap().volumes.is_empty());
    }

    #[tokio::test]
    async fn test_failure_toast_cleared_by_next_save_attempt() {
        let sim = Simulation::new();
        let ui = on_tab(&sim, WorkspaceDetailsTab::Volumes).await;
        sim.fail_saves(true);

        ui.click_add_volume().await.unwrap();
        ui.enter_volume_name("prj").await.unwrap();
        ui.enter_volume_path("/prj").await.unwrap();
        ui.click_dialog_button(DialogButton::Add).await.unwrap();
        ui.click_save_changes().await.unwrap();
        ui.wait_notification("Failed to update workspace").await.unwrap();

        // Back to the saved state, so nothing is left to save
        ui.click_remove_volume("prj").await.unwrap();
        ui.click_dialog_button(DialogButton::Delete).await.unwrap();
        assert!(ui.click_save_changes().await.is_err());
        assert!(ui
            .wait_notification("Failed to update workspace")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_ssh_remove_and_generate() {
        let sim = Simulation::new();
        let ui = on_tab(&sim, WorkspaceDetailsTab::Ssh).await;

        assert!(ui.private_key_exists().await.unwrap());
        assert!(ui.public_key_exists().await.unwrap());

        ui.click_remove_default_key().await.unwrap();
        ui.wait_ssh_key_absent().await.unwrap();
        assert!(!ui.private_key_exists().await.unwrap());
        assert!(!ui.public_key_exists().await.unwrap());

        ui.click_generate_key().await.unwrap();
        assert!(ui.private_key_exists().await.unwrap());
        assert!(ui.public_key_exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_tab_content_requires_selected_tab() {
        let sim = Simulation::new();
        let ui = on_tab(&sim, WorkspaceDetailsTab::Overview).await;
        let err = ui.click_add_server().await.unwrap_err();
        assert!(matches!(err, Error::ElementNotFound(_)));
    }

    #[tokio::test]
    async fn test_closed_session_rejects_actions() {
        let sim = Simulation::new();
        let ui = sim.dashboard();
        ui.close().await.unwrap();
        ui.close().await.unwrap();
        assert_eq!(sim.closed_sessions(), 1);
        assert!(matches!(
            ui.open().await.unwrap_err(),
            Error::SessionNotCreated(_)
        ));
    }
}
