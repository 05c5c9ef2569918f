use anyhow::Result;
use clap::Parser;
use go2ts::{run, OutputFormat, RunOptions};
use go2ts_core::{Marker, DEFAULT_MARKER};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "go2ts")]
#[command(version)]
#[command(about = "Generate TypeScript types from annotated Go structs", long_about = None)]
struct Cli {
    /// Directory holding the Go sources
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Output file ("-" writes to stdout)
    #[arg(short, long, default_value = "./go-types.ts")]
    out: PathBuf,

    /// Comment that marks a struct for export
    #[arg(short, long, env = "GO2TS_MARKER", default_value = DEFAULT_MARKER)]
    marker: String,

    /// Descend into sub-directories
    #[arg(short, long)]
    recursive: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Ts)]
    format: OutputFormat,

    /// Fail when translation produced any diagnostic
    #[arg(long)]
    strict: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout may carry the generated output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.debug)
        .with_writer(std::io::stderr)
        .init();

    let options = RunOptions {
        dir: cli.dir,
        out: cli.out,
        marker: Marker::new(cli.marker)?,
        recursive: cli.recursive,
        format: cli.format,
        strict: cli.strict,
    };
    run(&options).await?;
    Ok(())
}
