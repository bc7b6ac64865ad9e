//! CLI interface for trailmap.
//!
//! Each subcommand is non-interactive: arguments in, JSON out on stdout.
//! Logs and summaries go to stderr.
//!
//! - `trailmap reconstruct` — rebuild every entity's trail from a source.
//! - `trailmap parse-timestamp` — check a single timestamp.

mod format;
mod source;

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use trailmap::config::Config;
use trailmap::model::AdapterKind;
use trailmap::timestamp::{self, TimestampFormat};
use trailmap::{Engine, TrailQuery};

use format::{error_json, render_trails, summarize};
use source::SourceArgs;

/// trailmap — rebuild movement trails from sensor sightings.
#[derive(Debug, Parser)]
#[command(name = "trailmap", after_long_help = USAGE_HELP)]
pub struct Cli {
    /// Config file. Defaults to `~/.trailmap/config.toml` when it exists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const USAGE_HELP: &str = r#"Examples:
  trailmap reconstruct --input alerts.jsonl
  trailmap reconstruct --adapter embedded --sqlite alerts.sqlite --table tracks
  trailmap reconstruct --input alerts.json --search alice --hops --out trails.json
  trailmap parse-timestamp 2024-02-01T00:00:00.000000Z --format utc-micros

Set RUST_LOG=debug to see per-stage counts on stderr."#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconstruct one trail per entity from a batch of sightings.
    ///
    /// Trails are written as a JSON array to `--out` (if given) or stdout.
    /// Visits with a missing field or malformed timestamp are dropped and
    /// counted; a source that cannot be read fails the whole command.
    Reconstruct {
        /// Record shape. Overrides the configured adapter.
        #[arg(long, value_enum)]
        adapter: Option<AdapterArg>,

        #[command(flatten)]
        source: SourceArgs,

        /// Only keep trails whose id or name contains this text (case-insensitive).
        #[arg(long)]
        search: Option<String>,

        /// Include consecutive sensor hops with elapsed seconds.
        #[arg(long)]
        hops: bool,

        /// Write the trails JSON to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Parse one timestamp and print its canonical form.
    ParseTimestamp {
        /// The timestamp text.
        text: String,

        /// Expected encoding.
        #[arg(long, value_enum, default_value = "naive")]
        format: FormatArg,
    },
}

/// CLI-facing adapter, mapped to the domain `AdapterKind`.
#[derive(Debug, Clone, ValueEnum)]
pub enum AdapterArg {
    /// One record per sighting, naive second-precision timestamps.
    Flat,
    /// One record per entity with embedded visits, UTC microsecond timestamps.
    Embedded,
}

impl AdapterArg {
    fn to_domain(&self) -> AdapterKind {
        match self {
            Self::Flat => AdapterKind::Flat,
            Self::Embedded => AdapterKind::Embedded,
        }
    }
}

/// CLI-facing timestamp format, mapped to the domain `TimestampFormat`.
#[derive(Debug, Clone, ValueEnum)]
pub enum FormatArg {
    /// `YYYY-MM-DDTHH:MM:SS`
    Naive,
    /// `YYYY-MM-DDTHH:MM:SS.ffffffZ`
    UtcMicros,
}

impl FormatArg {
    fn to_domain(&self) -> TimestampFormat {
        match self {
            Self::Naive => TimestampFormat::Naive,
            Self::UtcMicros => TimestampFormat::UtcMicros,
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Reconstruct {
            adapter,
            source,
            search,
            hops,
            out,
        } => {
            let config = Config::load(cli.config.as_deref()).map_err(|e| e.to_string())?;
            let adapter = adapter.map_or(config.adapter, |a| a.to_domain());
            cmd_reconstruct(&config, adapter, &source, search.as_deref(), hops, out)
        }
        Command::ParseTimestamp { text, format } => cmd_parse_timestamp(&text, &format),
    }
}

fn cmd_reconstruct(
    config: &Config,
    adapter: AdapterKind,
    source: &SourceArgs,
    search: Option<&str>,
    hops: bool,
    out: Option<PathBuf>,
) -> Result<(), String> {
    let source = source.resolve(config)?;

    let mut result = match Engine::new(adapter).run(source.as_ref()) {
        Ok(result) => result,
        Err(e) => {
            println!("{}", error_json(&e));
            return Err(e.to_string());
        }
    };

    let total = result.trails.len();
    let trails = std::mem::take(&mut result.trails);
    let trails = match search {
        Some(text) => TrailQuery::new(text).filter(trails),
        None => trails,
    };
    let json = render_trails(&trails, hops)?;

    match out {
        Some(path) => {
            fs::write(&path, &json)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            eprintln!("{} → {}", summarize(&result, trails.len(), total), path.display());
        }
        None => {
            println!("{json}");
            eprintln!("{}", summarize(&result, trails.len(), total));
        }
    }

    Ok(())
}

fn cmd_parse_timestamp(text: &str, format: &FormatArg) -> Result<(), String> {
    let instant = timestamp::parse(text, format.to_domain()).map_err(|e| e.to_string())?;
    println!("{instant}");
    Ok(())
}
