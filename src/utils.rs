use anyhow::{Context, Result};
use glob::{glob, Pattern};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
};

static NON_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("name filter regex is valid"));
static SEPARATOR_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-\s]+").expect("separator regex is valid"));

/// Turn a sheet or table label into something safe for a file/folder name.
///
/// Drops everything but word chars, whitespace and hyphens, trims, then
/// collapses runs of hyphens/whitespace into a single `_`.
pub fn sanitize_name(raw: &str) -> String {
    let kept = NON_NAME_CHARS.replace_all(raw, "");
    SEPARATOR_RUNS.replace_all(kept.trim(), "_").into_owned()
}

/// A cell counts as blank when nothing but whitespace is left.
pub fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// Render a spreadsheet number the way a person would type it:
/// integral values lose their fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// All files in `dir` matching `pattern` (e.g. `*.csv`), sorted by path.
pub fn list_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = format!("{}/{}", Pattern::escape(&dir.to_string_lossy()), pattern);
    let mut files: Vec<PathBuf> = glob(&full)
        .with_context(|| format!("invalid glob pattern {}", full))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Immediate subdirectories of `dir`, sorted by path.
pub fn list_subfolders(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    folders.sort();
    Ok(folders)
}

/// File stem as an owned string, `""` if there is none.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Directory name as an owned string, `""` if there is none.
pub fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
