use std::path::{Path, PathBuf};

use crate::types::FuzzingInfo;

pub const FUZZING_DIR: &str = "fuzzing";

/// Detect fuzzing harnesses under `<folder>/fuzzing`.
///
/// Harnesses are the `.c` sources in `fuzzing/harness/` plus any `fuzz_*.c`
/// file directly in `fuzzing/`. Recorded crashes are the files in
/// `fuzzing/crashes/`.
pub fn detect(folder: &Path) -> Option<FuzzingInfo> {
    let dir = folder.join(FUZZING_DIR);
    if !dir.is_dir() {
        return None;
    }

    let mut harnesses: Vec<String> = c_sources(&dir.join("harness"))
        .into_iter()
        .chain(
            c_sources(&dir)
                .into_iter()
                .filter(|stem| stem.starts_with("fuzz_")),
        )
        .collect();
    harnesses.sort();
    harnesses.dedup();
    if harnesses.is_empty() {
        return None;
    }

    let mut crashes: Vec<String> = list_dir(&dir.join("crashes"))
        .into_iter()
        .filter(|p| p.is_file())
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .map(|name| format!("crashes/{name}"))
        .collect();
    crashes.sort();

    Some(FuzzingInfo {
        directory: PathBuf::from(FUZZING_DIR),
        harnesses,
        crashes,
    })
}

fn c_sources(dir: &Path) -> Vec<String> {
    list_dir(dir)
        .into_iter()
        .filter(|p| p.extension().is_some_and(|ext| ext == "c"))
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect()
}

fn list_dir(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default()
}
