//! Library interface for the go2ts command
//!
//! Loads every Go package under a directory, translates the packages
//! concurrently and renders one output document.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use go2ts_codegen::{translate_unit, Translation};
use go2ts_core::{CompilationUnit, Marker};
use go2ts_parser::{load_dir, Package};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Output path meaning "write to stdout"
pub const STDOUT: &str = "-";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// TypeScript definitions separated by blank lines
    #[default]
    Ts,
    /// JSON object mapping each name to its definition
    Json,
    /// The parsed compilation units as JSON
    Ir,
}

/// Everything one run needs
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub dir: PathBuf,
    pub out: PathBuf,
    pub marker: Marker,
    pub recursive: bool,
    pub format: OutputFormat,
    pub strict: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            out: PathBuf::from("./go-types.ts"),
            marker: Marker::default(),
            recursive: false,
            format: OutputFormat::Ts,
            strict: false,
        }
    }
}

/// What a run produced
#[derive(Debug)]
pub struct RunReport {
    pub packages: usize,
    pub translation: Translation,
    pub rendered: String,
}

impl RunReport {
    pub fn definitions(&self) -> usize {
        self.translation.len()
    }

    pub fn diagnostics(&self) -> usize {
        self.translation.diagnostics().count()
    }
}

/// Translate every package, one blocking task each
///
/// Results come back in package order regardless of completion order.
pub async fn translate_packages(packages: &[Package], marker: &Marker) -> Result<Translation> {
    let mut tasks = JoinSet::new();
    for (index, package) in packages.iter().enumerate() {
        let unit = package.unit.clone();
        let marker = marker.clone();
        tasks.spawn_blocking(move || (index, translate_unit(&unit, &marker)));
    }

    let mut results: Vec<Option<Translation>> = vec![None; packages.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, translation) = joined.context("translation task panicked")?;
        debug!(
            "package {} translated: {} definitions",
            packages[index].name,
            translation.len()
        );
        results[index] = Some(translation);
    }

    let mut merged = Translation::default();
    for translation in results.into_iter().flatten() {
        merged.merge(translation);
    }
    Ok(merged)
}

/// Render the output document
pub fn render(
    format: OutputFormat,
    packages: &[Package],
    translation: &Translation,
) -> Result<String> {
    match format {
        OutputFormat::Ts => Ok(translation.to_blob()),
        OutputFormat::Json => Ok(translation.to_json()?),
        OutputFormat::Ir => {
            let units: Vec<&CompilationUnit> = packages.iter().map(|p| &p.unit).collect();
            Ok(serde_json::to_string_pretty(&units)?)
        }
    }
}

fn write_output(out: &Path, rendered: &str) -> Result<()> {
    if out == Path::new(STDOUT) {
        print!("{}", rendered);
        return Ok(());
    }
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(out, rendered).with_context(|| format!("Failed to write {}", out.display()))?;
    info!("Wrote {}", out.display());
    Ok(())
}

/// Load, translate, render and write
pub async fn run(options: &RunOptions) -> Result<RunReport> {
    info!("Scanning {} for Go packages", options.dir.display());
    let packages = load_dir(&options.dir, options.recursive)
        .with_context(|| format!("Failed to load Go sources from {}", options.dir.display()))?;

    let translation = translate_packages(&packages, &options.marker).await?;
    for diagnostic in translation.diagnostics().entries() {
        warn!("{}", diagnostic);
    }

    if options.strict && !translation.diagnostics().is_empty() {
        bail!(
            "--strict: translation produced diagnostics\n{}",
            translation.diagnostics().format_summary()
        );
    }

    let rendered = render(options.format, &packages, &translation)?;
    write_output(&options.out, &rendered)?;

    info!(
        "Generated {} definitions from {} packages",
        translation.len(),
        packages.len()
    );
    Ok(RunReport {
        packages: packages.len(),
        translation,
        rendered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(dir: &Path, name: &str, source: &str) -> std::io::Result<()> {
        if let Some(parent) = dir.join(name).parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dir.join(name), source)
    }

    #[tokio::test]
    async fn test_packages_merge_in_order() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write(
            dir.path(),
            "a/a.go",
            "package a\n\n// @ts-export\ntype First struct {\n\tX int\n}\n",
        )?;
        write(
            dir.path(),
            "b/b.go",
            "package b\n\n// @ts-export\ntype Second struct {\n\tY string\n}\n\n// @ts-export\ntype First struct {\n\tZ bool\n}\n",
        )?;

        let packages = load_dir(dir.path(), true)?;
        let translation = translate_packages(&packages, &Marker::default()).await?;

        assert_eq!(translation.names().collect::<Vec<_>>(), vec!["First", "Second"]);
        assert!(translation
            .get("First")
            .is_some_and(|s| s.contains("X: number")));
        assert_eq!(translation.diagnostics().count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_strict_run_fails_without_writing() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write(
            dir.path(),
            "m.go",
            "package m\n\n// @ts-export\ntype Holder struct {\n\tP *int\n}\n",
        )?;
        let out = dir.path().join("out").join("types.ts");

        let options = RunOptions {
            dir: dir.path().to_path_buf(),
            out: out.clone(),
            strict: true,
            ..RunOptions::default()
        };
        assert!(run(&options).await.is_err());
        assert!(!out.exists());

        let lenient = RunOptions {
            strict: false,
            ..options
        };
        let report = run(&lenient).await?;
        assert_eq!(report.definitions(), 1);
        assert_eq!(report.diagnostics(), 1);
        assert_eq!(fs::read_to_string(&out)?, "export type Holder = {\n    P: any;\n};\n");
        Ok(())
    }

    #[test]
    fn test_render_ir() -> Result<(), Box<dyn std::error::Error>> {
        let mut unit = CompilationUnit::new("p");
        unit.source_files.push("p.go".to_string());
        let packages = vec![Package {
            dir: PathBuf::from("p"),
            name: "p".to_string(),
            unit,
        }];
        let rendered = render(OutputFormat::Ir, &packages, &Translation::default())?;
        let value: serde_json::Value = serde_json::from_str(&rendered)?;
        assert_eq!(value[0]["package"], "p");
        Ok(())
    }
}
