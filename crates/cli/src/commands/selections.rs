use anyhow::Result;

use super::{open_session, save_session};
use crate::cli::GlobalArgs;

pub fn select_variant_command(global: &GlobalArgs, value: &str) -> Result<()> {
    let mut session = open_session(global)?;
    session.select_variant(value)?;
    save_session(&session)?;
    println!("✅ Selected variant {value}");
    Ok(())
}

pub fn select_use_case_command(global: &GlobalArgs, name: &str) -> Result<()> {
    let mut session = open_session(global)?;
    session.select_build_use_case(name)?;
    save_session(&session)?;
    println!("✅ Selected build use case {name}");
    Ok(())
}

pub fn select_fuzz_harness_command(global: &GlobalArgs, name: &str) -> Result<()> {
    let mut session = open_session(global)?;
    session.select_fuzz_harness(name)?;
    save_session(&session)?;
    println!("✅ Selected fuzzing harness {name}");
    Ok(())
}

pub fn select_crash_command(global: &GlobalArgs, name: &str) -> Result<()> {
    let mut session = open_session(global)?;
    session.select_fuzz_crash(name)?;
    save_session(&session)?;
    println!("✅ Selected crash {name}");
    Ok(())
}

pub fn select_tests_command(global: &GlobalArgs, names: Vec<String>) -> Result<()> {
    let mut session = open_session(global)?;
    let summary = if names.is_empty() {
        "all tests".to_string()
    } else {
        names.join(", ")
    };
    session.set_selected_tests(names)?;
    save_session(&session)?;
    println!("✅ Selected {summary}");
    Ok(())
}

pub fn add_test_deps_command(global: &GlobalArgs, dependencies: &str) -> Result<()> {
    let mut session = open_session(global)?;
    session.set_test_dependencies(dependencies)?;
    save_session(&session)?;
    if dependencies.trim().is_empty() {
        println!("✅ Removed additional test dependencies");
    } else {
        println!("✅ Additional test dependencies: {}", dependencies.trim());
    }
    Ok(())
}
