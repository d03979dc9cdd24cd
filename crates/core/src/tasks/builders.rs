//! Command builders referenced by the default task catalog

use super::context::BuildContext;

pub fn remove_container(ctx: &BuildContext<'_>) -> String {
    ctx.shell.remove_container(&ctx.app.container_name)
}

pub fn create_container(ctx: &BuildContext<'_>) -> String {
    ctx.shell.create_container(
        &ctx.config.docker_image,
        &ctx.app.folder_path,
        &ctx.app.container_name,
    )
}

pub fn open_terminal(ctx: &BuildContext<'_>) -> String {
    ctx.shell
        .open_terminal(&ctx.app.container_name, ctx.config.open_container_as_root)
}

pub fn build_c(ctx: &BuildContext<'_>) -> String {
    ctx.in_build_dir(&format!("{} && make -j{}", ctx.sdk_export(), ctx.make_flags()))
}

pub fn build_rust(ctx: &BuildContext<'_>) -> String {
    ctx.in_build_dir(&format!("cargo ledger build {}", ctx.profile().rust_target))
}

pub fn clean_c(ctx: &BuildContext<'_>) -> String {
    ctx.in_build_dir(&format!("{} && make clean", ctx.sdk_export()))
}

pub fn clean_rust(ctx: &BuildContext<'_>) -> String {
    ctx.in_build_dir("cargo clean")
}

pub fn scan_build(ctx: &BuildContext<'_>) -> String {
    ctx.in_build_dir(&format!(
        "{} && make -B -j scan-build{}",
        ctx.sdk_export(),
        ctx.make_flags()
    ))
}

/// Path of the app binary loaded by the emulator, relative to the build dir
fn elf_path(ctx: &BuildContext<'_>) -> String {
    match ctx.app.language {
        crate::types::Language::C => {
            format!("build/{}/bin/app.elf", ctx.profile().build_dir_model)
        }
        crate::types::Language::Rust => format!(
            "target/{}/release/{}",
            ctx.profile().rust_target,
            ctx.app.name
        ),
    }
}

pub fn run_emulator(ctx: &BuildContext<'_>) -> String {
    ctx.in_build_dir(&format!(
        "speculos --model {} {}",
        ctx.profile().emulator_model,
        elf_path(ctx)
    ))
}

pub fn kill_emulator(ctx: &BuildContext<'_>) -> String {
    ctx.in_container("pkill -f speculos || true")
}

/// `pip install` of the pytest requirements, preceded by the app's extra
/// dependencies from the configuration
pub fn test_dependencies(ctx: &BuildContext<'_>) -> String {
    let pip = format!(
        "pip install -r {}/requirements.txt",
        ctx.app.pytest_dir.display()
    );
    match ctx.config.additional_deps(&ctx.app.folder_name) {
        Some(extra) => ctx.in_container(&format!("{} && {pip}", extra.trim())),
        None => ctx.in_container(&pip),
    }
}

fn pytest(ctx: &BuildContext<'_>, extra: &str) -> String {
    ctx.in_container(&format!(
        "pytest {} --tb=short -v --device {}{}{extra}",
        ctx.app.pytest_dir.display(),
        ctx.profile().emulator_model,
        ctx.pytest_selection()
    ))
}

pub fn run_tests(ctx: &BuildContext<'_>) -> String {
    pytest(ctx, "")
}

pub fn run_tests_with_display(ctx: &BuildContext<'_>) -> String {
    pytest(ctx, " --display")
}

pub fn update_snapshots(ctx: &BuildContext<'_>) -> String {
    pytest(ctx, " --golden_run")
}

pub fn load_app_c(ctx: &BuildContext<'_>) -> String {
    ctx.in_build_dir(&format!(
        "python3 -m ledgerblue.loadApp --targetId {:#x} --tlv --fileName build/{}/bin/app.hex --appName \"{}\" --delete",
        ctx.profile().target_id,
        ctx.profile().build_dir_model,
        ctx.app.name
    ))
}

pub fn load_app_rust(ctx: &BuildContext<'_>) -> String {
    ctx.in_build_dir(&format!(
        "cargo ledger build {} --load",
        ctx.profile().rust_target
    ))
}

pub fn delete_app(ctx: &BuildContext<'_>) -> String {
    ctx.in_container(&format!(
        "python3 -m ledgerblue.deleteApp --targetId {:#x} --appName \"{}\"",
        ctx.profile().target_id,
        ctx.app.name
    ))
}

pub fn onboard_device(ctx: &BuildContext<'_>) -> String {
    ctx.in_container(&format!(
        "python3 -m ledgerblue.hostOnboard --apdu --id 0 --pin {} --prefix \"\" --passphrase \"\" --words \"{}\"",
        ctx.config.onboarding_pin, ctx.config.onboarding_seed
    ))
}

fn fuzz(ctx: &BuildContext<'_>, args: &str) -> String {
    let (Some(dir), Some(harness)) = (ctx.fuzzing_dir(), ctx.fuzz_harness()) else {
        return String::new();
    };
    ctx.in_container(&format!(
        "{} && cd {dir} && ./local_run.sh --fuzzer=build/{harness}{args}",
        ctx.sdk_export()
    ))
}

pub fn run_fuzzer(ctx: &BuildContext<'_>) -> String {
    fuzz(ctx, " --build=1 --j=4 --run-fuzzer=1")
}

pub fn run_crash(ctx: &BuildContext<'_>) -> String {
    match ctx.fuzz_crash() {
        Some(crash) => fuzz(ctx, &format!(" --run-crash={crash}")),
        None => String::new(),
    }
}

pub fn inspect_coverage(ctx: &BuildContext<'_>) -> String {
    fuzz(ctx, " --compute-coverage=1")
}
