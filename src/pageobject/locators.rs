//! Dashboard selectors
//!
//! All XPath knowledge of the dashboard markup lives here. Values
//! interpolated into an expression go through [`xpath_literal`].

use crate::webdriver::{xpath_literal, Locator};

use super::{DialogButton, NavigationItem, WorkspaceDetailsTab};

fn xpath(expr: String) -> Locator {
    Locator::XPath(expr)
}

// === Dashboard frame ===

pub fn navigation_item(item: NavigationItem) -> Locator {
    xpath(format!(
        "//*[@id='dashboard-nav']//a[@href={}]",
        xpath_literal(&format!("#/{}", item.route()))
    ))
}

pub fn toolbar_title(title: &str) -> Locator {
    xpath(format!(
        "//div[contains(@class,'che-toolbar-title-label') and normalize-space(text())={}]",
        xpath_literal(title)
    ))
}

pub fn notification(message: &str) -> Locator {
    xpath(format!(
        "//md-toast//*[contains(normalize-space(text()),{})]",
        xpath_literal(message)
    ))
}

pub fn any_notification() -> Locator {
    Locator::Css("md-toast".to_string())
}

// === Workspaces list ===

pub fn workspace_row(name: &str) -> Locator {
    xpath(format!(
        "//div[@id={}]",
        xpath_literal(&format!("ws-name-{}", name))
    ))
}

// === Workspace details frame ===

pub fn details_tab(tab: WorkspaceDetailsTab) -> Locator {
    xpath(format!(
        "//md-tabs-canvas//md-tab-item//span[normalize-space(text())={}]",
        xpath_literal(tab.label())
    ))
}

pub fn dialog_button(button: DialogButton) -> Locator {
    xpath(format!(
        "//md-dialog//button[normalize-space(.)={}]",
        xpath_literal(button.label())
    ))
}

pub fn save_changes_button() -> Locator {
    xpath("//che-button-save-flat//button[@name='saveButton']".to_string())
}

// === Overview tab ===

pub fn workspace_name_input() -> Locator {
    xpath("//input[@name='workspaceName']".to_string())
}

pub fn delete_workspace_button() -> Locator {
    xpath("//che-button-danger[@che-button-title='Delete']/button".to_string())
}

pub fn export_button() -> Locator {
    xpath("//button[@name='export-workspace-button']".to_string())
}

pub fn export_clipboard_button() -> Locator {
    xpath("//che-button-default[@che-button-title='Copy to clipboard']/button".to_string())
}

pub fn export_download_button() -> Locator {
    xpath("//che-button-primary[@che-button-title='Download']/button".to_string())
}

pub fn export_hide_button() -> Locator {
    xpath("//button[@name='hide-export-button']".to_string())
}

// === Servers tab ===

pub fn add_server_button() -> Locator {
    xpath("//che-button-primary[@che-button-title='Add Server']/button".to_string())
}

pub fn add_server_dialog() -> Locator {
    xpath("//md-dialog//*[contains(@class,'che-popup-title') and normalize-space(text())='Add a new server']".to_string())
}

pub fn server_reference_input() -> Locator {
    xpath("//md-dialog//input[@name='reference']".to_string())
}

pub fn server_port_input() -> Locator {
    xpath("//md-dialog//input[@name='port']".to_string())
}

pub fn server_protocol_input() -> Locator {
    xpath("//md-dialog//input[@name='protocol']".to_string())
}

fn server_row_expr(reference: &str) -> String {
    format!(
        "//div[@id={}]",
        xpath_literal(&format!("server-name-{}", reference))
    )
}

pub fn server_row(reference: &str) -> Locator {
    xpath(server_row_expr(reference))
}

pub fn server_port_cell(reference: &str) -> Locator {
    xpath(format!("{}//span[@name='server-port']", server_row_expr(reference)))
}

pub fn edit_server_button(reference: &str) -> Locator {
    xpath(format!("{}//div[@name='edit-server']", server_row_expr(reference)))
}

pub fn delete_server_button(reference: &str) -> Locator {
    xpath(format!("{}//div[@name='delete-server']", server_row_expr(reference)))
}

// === SSH tab ===

pub fn private_key_field() -> Locator {
    xpath("//textarea[@name='privateKey']".to_string())
}

pub fn public_key_field() -> Locator {
    xpath("//textarea[@name='publicKey']".to_string())
}

pub fn remove_default_ssh_key_button() -> Locator {
    xpath("//button[@name='remove-default-ssh-key']".to_string())
}

pub fn generate_ssh_key_button() -> Locator {
    xpath("//button[@name='generate-ssh-key']".to_string())
}

// === Volumes tab ===

pub fn add_volume_button() -> Locator {
    xpath("//che-button-primary[@che-button-title='Add Volume']/button".to_string())
}

pub fn volume_name_input() -> Locator {
    xpath("//md-dialog//input[@name='name']".to_string())
}

pub fn volume_path_input() -> Locator {
    xpath("//md-dialog//input[@name='path']".to_string())
}

fn volume_row_expr(name: &str) -> String {
    format!(
        "//div[@id={}]",
        xpath_literal(&format!("volume-name-{}", name))
    )
}

pub fn volume_row(name: &str) -> Locator {
    xpath(volume_row_expr(name))
}

pub fn volume_path_cell(name: &str) -> Locator {
    xpath(format!("{}//span[@name='volume-path']", volume_row_expr(name)))
}

pub fn edit_volume_button(name: &str) -> Locator {
    xpath(format!("{}//div[@name='edit-volume']", volume_row_expr(name)))
}

pub fn remove_volume_button(name: &str) -> Locator {
    xpath(format!("{}//div[@name='remove-volume']", volume_row_expr(name)))
}
