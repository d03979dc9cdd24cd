use serde::Serialize;
use std::fmt::Write;

use crate::session::Session;
use crate::tasks::{TaskGroup, TaskState};

/// One row of the task tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeItem {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub icon: &'static str,
    /// Task to execute when the row is clicked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TaskState>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeItem>,
}

impl TreeItem {
    fn leaf(label: impl Into<String>, icon: &'static str) -> Self {
        Self {
            label: label.into(),
            description: None,
            tooltip: None,
            icon,
            command: None,
            state: None,
            children: Vec::new(),
        }
    }
}

/// Build the tree: selected app, selected target, then one node per task
/// group. Unavailable tasks are left out and groups without any task are
/// dropped.
pub fn build_tree(session: &Session) -> Vec<TreeItem> {
    let mut items = Vec::new();

    let mut app_item = match session.current_app() {
        Some(app) => {
            let mut item = TreeItem::leaf(format!("App: {}", app.name), "folder");
            item.description = Some(app.language.as_str().to_string());
            item.tooltip = Some(app.folder_path.display().to_string());
            item
        }
        None => TreeItem::leaf("App: none", "folder"),
    };
    app_item.command = Some("select-app".to_string());
    items.push(app_item);

    let mut target_item = TreeItem::leaf(
        format!("Target: {}", session.selected_target()),
        "circuit-board",
    );
    target_item.command = Some("select-target".to_string());
    items.push(target_item);

    for group in TaskGroup::ALL {
        let children: Vec<TreeItem> = session
            .catalog()
            .in_group(group)
            .filter(|task| task.state != TaskState::Unavailable)
            .map(|task| {
                let disabled = task.state == TaskState::Disabled;
                let mut item = TreeItem::leaf(
                    session.task_label(task),
                    if disabled { "circle-slash" } else { "play" },
                );
                item.tooltip = Some(task.tooltip.to_string());
                item.state = Some(task.state);
                if disabled {
                    item.description = Some("disabled".to_string());
                } else {
                    item.command = Some(task.name.to_string());
                }
                item
            })
            .collect();
        if children.is_empty() {
            continue;
        }
        let mut node = TreeItem::leaf(group.label(), "list-tree");
        node.children = children;
        items.push(node);
    }
    items
}

/// Plain-text rendering, two spaces of indentation per level
pub fn render_tree(items: &[TreeItem]) -> String {
    let mut out = String::new();
    for item in items {
        render_item(&mut out, item, 0);
    }
    out
}

fn render_item(out: &mut String, item: &TreeItem, depth: usize) {
    let _ = write!(out, "{}{}", "  ".repeat(depth), item.label);
    if let Some(description) = &item.description {
        let _ = write!(out, " ({description})");
    }
    out.push('\n');
    for child in &item.children {
        render_item(out, child, depth + 1);
    }
}
