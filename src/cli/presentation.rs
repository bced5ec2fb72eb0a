//! CLI presentation: text formatters per command.

use crate::store::{CredentialStore, WorkspaceCredential};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::path::Path;

pub fn format_set_summary(applied: usize) -> String {
    format!("Successfully applied status to {} workspace(s)", applied)
}

pub fn format_init_summary(workspace: &WorkspaceCredential, store_path: &Path) -> String {
    let mut out = format!(
        "Linked workspace '{}' and saved credentials to {}",
        workspace.name,
        store_path.display()
    );
    if let Some(user) = &workspace.user {
        out.push_str(&format!("\nAuthorized user: {}", user));
    }
    out
}

/// Names and groups of every linked workspace. Tokens are never shown.
pub fn format_workspaces_table(store: &CredentialStore) -> String {
    if store.is_empty() {
        return "No workspaces linked.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Workspace", "User", "Groups"]);
    for workspace in store.workspaces() {
        let groups = if workspace.groups.is_empty() {
            "-".to_string()
        } else {
            workspace.groups.join(", ")
        };
        table.add_row(vec![
            workspace.name.clone(),
            workspace.user.clone().unwrap_or_else(|| "-".to_string()),
            groups,
        ]);
    }
    table.to_string()
}

pub fn format_version() -> String {
    format!("slack-status v{}", env!("CARGO_PKG_VERSION"))
}
