//! Package discovery: find Go files on disk and merge them per package
//!
//! Files of the same package in the same directory share one compilation
//! unit, so a struct in `a.go` can reference an exported struct in `b.go`.

use crate::error::ParserError;
use crate::go::GoParser;
use go2ts_core::CompilationUnit;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// One Go package: every non-test file of one directory sharing a package name
#[derive(Debug, Clone)]
pub struct Package {
    pub dir: PathBuf,
    pub name: String,
    pub unit: CompilationUnit,
}

fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go")
}

/// Hidden, `vendor` and `testdata` directories never hold package sources
fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.') || name == "vendor" || name == "testdata")
        .unwrap_or(false)
}

/// Discover `.go` files under `dir`, sorted by path
pub fn discover_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ParserError> {
    if !dir.is_dir() {
        return Err(ParserError::NotADirectory(dir.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = entry?;
        if entry.file_type().is_file() && is_go_source(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    debug!("found {} Go files under {}", files.len(), dir.display());
    Ok(files)
}

/// Parse one file from disk
pub fn parse_file(path: &Path) -> Result<CompilationUnit, ParserError> {
    let source = fs::read_to_string(path).map_err(|source| ParserError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    GoParser::new()
        .with_file_name(path.display().to_string())
        .parse_source(&source)
}

/// Load and merge every package under `dir`
///
/// Packages are returned ordered by directory, then package name; the
/// declarations inside each unit follow file path order.
pub fn load_dir(dir: &Path, recursive: bool) -> Result<Vec<Package>, ParserError> {
    let mut packages: BTreeMap<(PathBuf, String), CompilationUnit> = BTreeMap::new();

    for path in discover_files(dir, recursive)? {
        let unit = parse_file(&path)?;
        let package_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let key = (package_dir, unit.package.clone());
        let merged = match packages.remove(&key) {
            Some(existing) => existing.merge(unit),
            None => unit,
        };
        packages.insert(key, merged);
    }

    info!("loaded {} packages from {}", packages.len(), dir.display());
    Ok(packages
        .into_iter()
        .map(|((dir, name), unit)| Package { dir, name, unit })
        .collect())
}
