//! Scenarios running from a workspace on disk to generated shell lines

use ledgerdev_core::config::Config;
use ledgerdev_core::presentation::{build_tree, render_tree};
use ledgerdev_core::{
    AppRegistry, Device, Error, HostPlatform, Language, Session, Target, TaskState,
};
use ledgerdev_tests::{write_c_app, write_fuzzing, write_rust_app};
use std::fs;
use tempfile::TempDir;

fn session_for(dir: &TempDir, folders: &[&str], platform: HostPlatform) -> Session {
    let folders = folders.iter().map(|f| dir.path().join(f)).collect();
    Session::new(Config::default(), platform, AppRegistry::new(folders))
}

#[test]
fn test_scan_mixed_workspace() {
    let dir = TempDir::new().unwrap();
    write_c_app(dir.path(), "app-boilerplate", ".", "Boilerplate").unwrap();
    write_rust_app(dir.path(), "app-rs", "nano-rs", &["nanox", "stax", "flex"]).unwrap();
    fs::create_dir_all(dir.path().join("docs")).unwrap();

    let session = session_for(
        &dir,
        &["app-boilerplate", "app-rs", "docs"],
        HostPlatform::Linux,
    );
    let apps = session.apps();
    assert_eq!(apps.len(), 2);
    assert_eq!(apps[0].name, "Boilerplate");
    assert_eq!(apps[0].language, Language::C);
    assert_eq!(apps[1].name, "nano-rs");
    assert_eq!(apps[1].language, Language::Rust);
    assert_eq!(
        apps[1].compatible_devices,
        vec![Device::NanoX, Device::Stax, Device::Flex]
    );
}

#[test]
fn test_makefile_in_subdirectory_builds_there() {
    let dir = TempDir::new().unwrap();
    write_c_app(dir.path(), "app-exchange", "app", "Exchange").unwrap();

    let session = session_for(&dir, &["app-exchange"], HostPlatform::Linux);
    let cmd = session.command_for("Build").unwrap();
    assert_eq!(
        cmd,
        "docker exec -it app-exchange-container bash -c \
         'cd /app/app && export BOLOS_SDK=$NANOX_SDK && make -j'"
    );
}

#[test]
fn test_build_all_targets_runs_once_per_device() {
    let dir = TempDir::new().unwrap();
    write_rust_app(dir.path(), "app-rs", "nano-rs", &["nanosplus", "flex"]).unwrap();

    let mut session = session_for(&dir, &["app-rs"], HostPlatform::Linux);
    assert_eq!(session.selected_target(), Target::Device(Device::NanoSPlus));
    assert_eq!(session.toggle_all_targets().target, Target::All);

    let cmd = session.command_for("Build").unwrap();
    let parts: Vec<&str> = cmd.split(" ; ").collect();
    assert_eq!(parts.len(), 2);
    assert!(parts[0].ends_with("bash -c 'cargo ledger build nanosplus'"));
    assert!(parts[1].ends_with("bash -c 'cargo ledger build flex'"));

    assert!(matches!(
        session.command_for("Run with emulator"),
        Err(Error::TaskDisabled(_))
    ));
    assert_eq!(
        session.toggle_all_targets().target,
        Target::Device(Device::NanoSPlus)
    );
}

#[test]
fn test_functional_tests_with_extra_dependencies() {
    let dir = TempDir::new().unwrap();
    write_c_app(dir.path(), "app-boilerplate", ".", "Boilerplate").unwrap();

    let mut session = session_for(&dir, &["app-boilerplate"], HostPlatform::Linux);
    session.select_target("Stax").unwrap();
    session
        .set_test_dependencies("apt-get update && apt-get install -y qemu-user-static")
        .unwrap();
    session
        .set_selected_tests(vec!["test_sign".to_string(), "test_version".to_string()])
        .unwrap();

    let cmd = session.command_for("Run tests").unwrap();
    let (deps, main) = cmd.split_once(" ; ").unwrap();
    assert!(deps.contains("apt-get install -y qemu-user-static && pip install -r tests/requirements.txt"));
    assert!(main.contains("pytest tests --tb=short -v --device stax -k \"test_sign or test_version\""));
}

#[test]
fn test_fuzzing_tasks_follow_selection() {
    let dir = TempDir::new().unwrap();
    let app = write_c_app(dir.path(), "app-boilerplate", ".", "Boilerplate").unwrap();
    write_fuzzing(&app, &["fuzz_apdu", "fuzz_tx"], &["crash-0001"]).unwrap();

    let mut session = session_for(&dir, &["app-boilerplate"], HostPlatform::Linux);
    assert_eq!(
        session.catalog().get("Run crash").unwrap().state,
        TaskState::Enabled
    );

    session.select_fuzz_harness("fuzz_tx").unwrap();
    session.select_fuzz_crash("crash-0001").unwrap();
    let cmd = session.command_for("Run crash").unwrap();
    assert!(cmd.contains("cd /app/fuzzing && ./local_run.sh --fuzzer=build/fuzz_tx --run-crash=crashes/crash-0001"));

    assert!(matches!(
        session.select_fuzz_harness("fuzz_nope"),
        Err(Error::MissingFuzzing(_))
    ));
}

#[test]
fn test_selections_survive_a_reload() {
    let dir = TempDir::new().unwrap();
    write_c_app(dir.path(), "app-boilerplate", ".", "Boilerplate").unwrap();
    write_rust_app(dir.path(), "app-rs", "nano-rs", &["flex"]).unwrap();
    let config = serde_json::json!({
        "workspaceFolders": ["app-boilerplate", "app-rs"],
        "dockerImage": "ledger-app-dev-tools:local"
    });
    fs::write(
        dir.path().join(".ledgerdev.json"),
        serde_json::to_string_pretty(&config).unwrap(),
    )
    .unwrap();

    let mut session = Session::open(dir.path(), HostPlatform::Linux, Vec::new()).unwrap();
    assert_eq!(session.apps().len(), 2);
    session.select_app("app-rs").unwrap();
    session.save().unwrap();

    let reloaded = Session::open(dir.path(), HostPlatform::Linux, Vec::new()).unwrap();
    assert_eq!(reloaded.current_app().unwrap().name, "nano-rs");
    assert_eq!(reloaded.selected_target(), Target::Device(Device::Flex));
    assert_eq!(reloaded.config().docker_image, "ledger-app-dev-tools:local");

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(".ledgerdev.json")).unwrap())
            .unwrap();
    assert_eq!(saved["apps"]["app-rs"]["selectedDevice"], "Flex");
}

#[test]
fn test_toggle_back_from_all_after_a_reload() {
    let dir = TempDir::new().unwrap();
    write_c_app(dir.path(), "app-boilerplate", ".", "Boilerplate").unwrap();
    let config = serde_json::json!({ "workspaceFolders": ["app-boilerplate"] });
    fs::write(
        dir.path().join(".ledgerdev.json"),
        serde_json::to_string_pretty(&config).unwrap(),
    )
    .unwrap();

    let mut session = Session::open(dir.path(), HostPlatform::Linux, Vec::new()).unwrap();
    session.select_target("stax").unwrap();
    session.save().unwrap();

    let mut session = Session::open(dir.path(), HostPlatform::Linux, Vec::new()).unwrap();
    assert_eq!(session.toggle_all_targets().target, Target::All);
    session.save().unwrap();

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(".ledgerdev.json")).unwrap())
            .unwrap();
    assert_eq!(saved["apps"]["app-boilerplate"]["selectedDevice"], "All");
    assert_eq!(saved["apps"]["app-boilerplate"]["previousDevice"], "Stax");

    let mut session = Session::open(dir.path(), HostPlatform::Linux, Vec::new()).unwrap();
    assert_eq!(session.selected_target(), Target::All);
    let selection = session.toggle_all_targets();
    assert_eq!(selection.target, Target::Device(Device::Stax));
    assert_eq!(selection.warning, None);
}

#[test]
fn test_rescan_reports_replaced_device() {
    let dir = TempDir::new().unwrap();
    let app = write_rust_app(dir.path(), "app-rs", "nano-rs", &["nanox"]).unwrap();

    let mut session = session_for(&dir, &["app-rs"], HostPlatform::Linux);
    session.select_target("nanox").unwrap();
    assert!(session.take_warnings().is_empty());

    fs::write(
        app.join("ledger_app.toml"),
        "[app]\nbuild_directory = \"./\"\nsdk = \"Rust\"\ndevices = [\"flex\"]\n",
    )
    .unwrap();
    session.rescan();

    assert_eq!(session.selected_target(), Target::Device(Device::Flex));
    let warnings = session.take_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("selecting Flex"));
    assert!(session.take_warnings().is_empty());
}

#[test]
fn test_windows_commands_use_powershell_quoting() {
    let dir = TempDir::new().unwrap();
    write_c_app(dir.path(), "app-boilerplate", ".", "Boilerplate").unwrap();

    let session = session_for(&dir, &["app-boilerplate"], HostPlatform::Windows);
    let cmd = session.recreate_command().unwrap();
    assert!(cmd.starts_with("docker rm -f app-boilerplate-container ; docker pull "));
    assert!(cmd.contains("; docker run --privileged"));
}

#[test]
fn test_tree_for_rust_app() {
    let dir = TempDir::new().unwrap();
    write_rust_app(dir.path(), "app-rs", "nano-rs", &["nanox"]).unwrap();

    let session = session_for(&dir, &["app-rs"], HostPlatform::Linux);
    let rendered = render_tree(&build_tree(&session));
    assert!(rendered.starts_with("App: nano-rs (Rust)\nTarget: Nano X\n"));
    assert!(rendered.contains("  Load app on device (disabled)\n"));
    assert!(!rendered.contains("Run scan-build"));
    assert!(!rendered.contains("Fuzzing"));
}
