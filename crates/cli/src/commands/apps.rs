use anyhow::Result;

use super::{open_session, save_session};
use crate::cli::GlobalArgs;
use crate::display::{format_apps, print_warning};

pub fn apps_command(global: &GlobalArgs) -> Result<()> {
    let session = open_session(global)?;
    if session.apps().is_empty() {
        println!("No app found in the workspace folders");
        return Ok(());
    }
    print!("{}", format_apps(&session));
    Ok(())
}

pub fn select_app_command(global: &GlobalArgs, name: &str) -> Result<()> {
    let mut session = open_session(global)?;
    if let Some(warning) = session.select_app(name)? {
        print_warning(&warning);
    }
    save_session(&session)?;
    if let Some(app) = session.current_app() {
        println!("✅ Selected app {} (target {})", app.name, session.selected_target());
    }
    Ok(())
}
