//! `roster` — command-line front end for the Roster school-records store.
//!
//! # Usage
//!
//! ```
//! roster teacher add --name "Ms. Lee" --employee-id E1 --subject Math
//! roster class add Algebra
//! roster teacher assign <TEACHER_ID> <CLASS_ID>
//! roster --json summary
//! ```
//!
//! Settings come from `roster.toml` (or `--config`) and `ROSTER_*` environment
//! variables. Every invocation opens the SQLite file, runs one command, and
//! exits; the active class selection therefore never outlives a command.

mod commands;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Parser;
use roster_core::RosterStore;
use roster_store_sqlite::SqliteKv;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use commands::Command;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Manage teachers, classes and students")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "roster.toml")]
  config: PathBuf,

  /// Override the database path from the config file.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime settings, deserialised from the config file and environment.
#[derive(Debug, Deserialize)]
struct Settings {
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
  /// Default log level when `RUST_LOG` is unset.
  #[serde(default = "default_log_level")]
  log:        String,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/roster/roster.db") }

fn default_log_level() -> String { "warn".to_string() }

fn load_settings(path: &Path) -> Result<Settings> {
  config::Config::builder()
    .add_source(config::File::from(path.to_path_buf()).required(false))
    .add_source(config::Environment::with_prefix("ROSTER"))
    .build()
    .with_context(|| format!("failed to read config file {}", path.display()))?
    .try_deserialize()
    .context("failed to deserialise settings")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
  let cli = Cli::parse();
  let settings = load_settings(&cli.config)?;

  let level: LevelFilter = settings
    .log
    .parse()
    .with_context(|| format!("invalid log level {:?}", settings.log))?;
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy(),
    )
    .init();

  let store_path = expand_tilde(cli.store.as_deref().unwrap_or(settings.store_path.as_path()));
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }

  let kv = SqliteKv::open(&store_path)
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let mut store = RosterStore::open(kv).context("failed to load roster")?;
  tracing::debug!(path = %store_path.display(), "opened roster");

  let rendered = commands::run(&mut store, cli.command)?;
  println!("{}", rendered.render(cli.json)?);

  if let Some(error) = store.last_persist_error() {
    eprintln!("warning: changes were applied but not saved: {error}");
  }

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
