//! Data models for the three surfaces an editor shows: the task tree, the
//! status bar and the webview panel. Every model is rebuilt from the
//! session on each refresh.

pub mod status_bar;
pub mod tree;
pub mod webview;

pub use status_bar::{StatusItem, build_status_bar, render_status_bar};
pub use tree::{TreeItem, build_tree, render_tree};
pub use webview::{AppEntry, HostMessage, TaskEntry, ViewMessage, WebviewBridge};
