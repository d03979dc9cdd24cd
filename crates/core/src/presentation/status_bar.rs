use serde::Serialize;

use crate::container::ContainerStatus;
use crate::session::Session;

/// One status bar entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusItem {
    pub text: String,
    pub tooltip: String,
    pub icon: &'static str,
    /// Command run when the entry is clicked
    pub command: &'static str,
}

/// App, target and, once polled, container entries
pub fn build_status_bar(session: &Session, container: Option<ContainerStatus>) -> Vec<StatusItem> {
    let app = session.current_app();
    let mut items = vec![
        StatusItem {
            text: app.map_or_else(|| "No app".to_string(), |a| a.name.clone()),
            tooltip: "Select app".to_string(),
            icon: "folder",
            command: "select-app",
        },
        StatusItem {
            text: session.selected_target().to_string(),
            tooltip: "Select target".to_string(),
            icon: "circuit-board",
            command: "select-target",
        },
    ];
    if let (Some(app), Some(status)) = (app, container) {
        items.push(StatusItem {
            text: format!("Container {status}"),
            tooltip: format!("{} is {status}", app.container_name),
            icon: status.icon(),
            command: "status",
        });
    }
    items
}

pub fn render_status_bar(items: &[StatusItem]) -> String {
    items
        .iter()
        .map(|item| item.text.as_str())
        .collect::<Vec<_>>()
        .join(" | ")
}
