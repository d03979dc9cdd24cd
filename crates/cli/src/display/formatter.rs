use ledgerdev_core::{Session, TargetRegistry, TaskGroup, TaskState};
use std::fmt::Write;

/// One line per app, the selected one marked with `*`
pub fn format_apps(session: &Session) -> String {
    let selected = session.current_app().map(|a| a.folder_name.as_str());
    let mut out = String::new();
    for app in session.apps() {
        let marker = if Some(app.folder_name.as_str()) == selected { "*" } else { " " };
        let devices: Vec<&str> = app.compatible_devices.iter().map(|d| d.display_name()).collect();
        let _ = writeln!(
            out,
            "{marker} {} ({}, {}) [{}]",
            app.name,
            app.folder_name,
            app.language.as_str(),
            devices.join(", ")
        );
    }
    out
}

pub fn format_targets(session: &Session) -> String {
    let selected = session.selected_target();
    let mut out = String::new();
    for target in TargetRegistry::available_targets(session.current_app()) {
        let marker = if target == selected { "*" } else { " " };
        let _ = writeln!(out, "{marker} {target}");
    }
    out
}

/// Tasks grouped like the tree; unavailable tasks are listed last so the
/// user knows why a task is missing.
pub fn format_tasks(session: &Session) -> String {
    let mut out = String::new();
    let mut unavailable = Vec::new();
    for group in TaskGroup::ALL {
        let mut header_written = false;
        for task in session.catalog().in_group(group) {
            let status = match task.state {
                TaskState::Enabled => "✅",
                TaskState::Disabled => "⛔",
                TaskState::Unavailable => {
                    unavailable.push(task.name);
                    continue;
                }
            };
            if !header_written {
                let _ = writeln!(out, "{}:", group.label());
                header_written = true;
            }
            let _ = writeln!(out, "   {status} {}", session.task_label(task));
        }
    }
    if !unavailable.is_empty() {
        let _ = writeln!(out, "Not available for this app: {}", unavailable.join(", "));
    }
    out
}

pub fn print_warning(message: &str) {
    eprintln!("⚠️  {message}");
}
