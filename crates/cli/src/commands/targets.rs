use anyhow::Result;

use super::{open_session, save_session};
use crate::cli::GlobalArgs;
use crate::display::{format_targets, print_warning};

pub fn targets_command(global: &GlobalArgs) -> Result<()> {
    let session = open_session(global)?;
    print!("{}", format_targets(&session));
    Ok(())
}

pub fn select_target_command(global: &GlobalArgs, name: &str) -> Result<()> {
    let mut session = open_session(global)?;
    let selection = session.select_target(name)?;
    if let Some(warning) = &selection.warning {
        print_warning(warning);
    }
    save_session(&session)?;
    println!("✅ Selected target {}", selection.target);
    Ok(())
}

pub fn toggle_all_command(global: &GlobalArgs) -> Result<()> {
    let mut session = open_session(global)?;
    let selection = session.toggle_all_targets();
    if let Some(warning) = &selection.warning {
        print_warning(warning);
    }
    save_session(&session)?;
    println!("✅ Selected target {}", selection.target);
    Ok(())
}
