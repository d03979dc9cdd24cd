//! Build descriptor (Makefile) inspection

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

use crate::types::{UNKNOWN_APP_NAME, VariantInfo};
use crate::utils::unquote;

/// Substring identifying a Makefile as an app built with the device SDK
pub const SDK_MARKER: &str = "include $(BOLOS_SDK)/Makefile.defines";

/// Deepest directory level, relative to a workspace folder, searched for Makefiles
pub const MAX_SCAN_DEPTH: usize = 2;

static APPNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"APPNAME\s*=\s*(.*)").expect("valid APPNAME regex"));
static VARIANT_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*VARIANT_PARAM\s*=\s*(\S+)").expect("valid regex"));
static VARIANT_VALUES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*VARIANT_VALUES\s*=\s*(.*)").expect("valid regex"));

/// A Makefile carrying the SDK marker, with its content already read
#[derive(Debug, Clone)]
pub struct SdkMakefile {
    pub path: PathBuf,
    pub content: String,
}

impl SdkMakefile {
    /// Directory holding the Makefile, relative to `folder`
    pub fn build_dir(&self, folder: &Path) -> PathBuf {
        let dir = self.path.parent().unwrap_or(folder);
        match dir.strip_prefix(folder) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn app_name(&self) -> String {
        parse_app_name(&self.content)
    }
}

pub fn is_sdk_makefile(content: &str) -> bool {
    content.contains(SDK_MARKER)
}

/// Find the shallowest Makefile carrying the SDK marker within
/// [`MAX_SCAN_DEPTH`] levels of `folder`. Hidden directories are skipped and
/// unreadable files are ignored.
pub fn find_sdk_makefile(folder: &Path) -> Option<SdkMakefile> {
    let mut candidates: Vec<(usize, PathBuf)> = WalkDir::new(folder)
        .max_depth(MAX_SCAN_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with('.'))
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "Makefile")
        .map(|e| (e.depth(), e.into_path()))
        .collect();
    candidates.sort();

    candidates.into_iter().find_map(|(_, path)| {
        let content = std::fs::read_to_string(&path).ok()?;
        if is_sdk_makefile(&content) {
            Some(SdkMakefile { path, content })
        } else {
            tracing::debug!("Skipping Makefile without SDK marker: {:?}", path);
            None
        }
    })
}

/// Extract the `APPNAME` assignment, defaulting to [`UNKNOWN_APP_NAME`]
pub fn parse_app_name(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .find_map(|line| APPNAME_RE.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| unquote(m.as_str()).to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_APP_NAME.to_string())
}

/// Extract `VARIANT_PARAM` and `VARIANT_VALUES`; both must be present
pub fn parse_variants(content: &str) -> Option<VariantInfo> {
    let param = content
        .lines()
        .find_map(|line| VARIANT_PARAM_RE.captures(line))
        .map(|caps| caps[1].to_string())?;
    let values: Vec<String> = content
        .lines()
        .find_map(|line| VARIANT_VALUES_RE.captures(line))
        .map(|caps| caps[1].split_whitespace().map(str::to_string).collect())?;
    if values.is_empty() {
        return None;
    }
    Some(VariantInfo { param, values })
}
