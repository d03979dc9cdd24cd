//! Workspace fixtures shared by the cross-crate scenario tests in `tests/`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Makefile of a C app built against the device SDK
pub fn c_makefile(app_name: &str) -> String {
    format!(
        "ifeq ($(BOLOS_SDK),)\n\
         $(error Environment variable BOLOS_SDK is not set)\n\
         endif\n\
         include $(BOLOS_SDK)/Makefile.defines\n\
         \n\
         APPNAME = \"{app_name}\"\n\
         APPVERSION_M = 2\n"
    )
}

/// Create `<root>/<folder>` holding a C app whose Makefile sits in
/// `build_dir` (relative, `.` for the folder itself)
pub fn write_c_app(root: &Path, folder: &str, build_dir: &str, app_name: &str) -> io::Result<PathBuf> {
    let app = root.join(folder);
    let makefile_dir = app.join(build_dir);
    fs::create_dir_all(&app)?;
    fs::create_dir_all(&makefile_dir)?;
    fs::write(makefile_dir.join("Makefile"), c_makefile(app_name))?;
    Ok(app)
}

/// Create `<root>/<folder>` holding a Rust app described by a
/// `ledger_app.toml` manifest
pub fn write_rust_app(root: &Path, folder: &str, package: &str, devices: &[&str]) -> io::Result<PathBuf> {
    let app = root.join(folder);
    fs::create_dir_all(app.join("src"))?;
    let devices = devices
        .iter()
        .map(|d| format!("\"{d}\""))
        .collect::<Vec<_>>()
        .join(", ");
    fs::write(
        app.join("ledger_app.toml"),
        format!("[app]\nbuild_directory = \"./\"\nsdk = \"Rust\"\ndevices = [{devices}]\n"),
    )?;
    fs::write(
        app.join("Cargo.toml"),
        format!("[package]\nname = \"{package}\"\nversion = \"1.0.0\"\nedition = \"2021\"\n"),
    )?;
    fs::write(app.join("src/main.rs"), "fn main() {}\n")?;
    Ok(app)
}

/// Add a fuzzing directory with the given harnesses and crash inputs
pub fn write_fuzzing(app: &Path, harnesses: &[&str], crashes: &[&str]) -> io::Result<()> {
    let fuzzing = app.join("fuzzing");
    fs::create_dir_all(fuzzing.join("harness"))?;
    fs::create_dir_all(fuzzing.join("crashes"))?;
    for harness in harnesses {
        fs::write(fuzzing.join("harness").join(format!("{harness}.c")), "")?;
    }
    for crash in crashes {
        fs::write(fuzzing.join("crashes").join(crash), [0u8; 4])?;
    }
    Ok(())
}
