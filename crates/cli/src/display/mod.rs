pub mod formatter;

pub use formatter::{format_apps, format_targets, format_tasks, print_warning};
