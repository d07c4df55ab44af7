//! CLI argument parsing for Playlet.
//!
//! The binary runs one playbook against one host:
//! `playlet HOSTNAME [options] PLAYBOOK_PATH`.

use anyhow::{bail, Context};
use clap::Parser;
use indexmap::IndexMap;
use serde_json::Value;
use std::path::PathBuf;

use playlet::session::SessionOptions;

/// Playlet - Run a playbook against a single host
///
/// Executes the tasks of every play in the playbook sequentially on the
/// target host, stops a play on the first failure, writes the structured
/// results to a JSON file, and prints a recap.
#[derive(Parser, Debug, Clone)]
#[command(name = "playlet")]
#[command(author = "Playlet Contributors")]
#[command(version)]
#[command(about = "Run a playbook against a single host", long_about = None)]
pub struct Cli {
    /// Target host name
    pub host: String,

    /// Path to the playbook file
    pub playbook: PathBuf,

    /// Extra variables (key=value, @file.yml, or a JSON mapping)
    #[arg(short = 'e', long = "extra-vars", action = clap::ArgAction::Append)]
    pub extra_vars: Vec<String>,

    /// Verbosity level (-v, -vv, -vvv, -vvvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Run in check mode (dry-run, don't make changes)
    #[arg(long = "check")]
    pub check_mode: bool,

    /// Run in diff mode (show differences)
    #[arg(long = "diff")]
    pub diff_mode: bool,

    /// Escalate privileges for all plays
    #[arg(short = 'b', long = "become")]
    pub r#become: bool,

    /// User to become when escalating
    #[arg(long)]
    pub become_user: Option<String>,

    /// Directory the result JSON file is written to
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Parses command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Builds session options from the flags.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            check_mode: self.check_mode,
            diff_mode: self.diff_mode,
            r#become: self.r#become,
            become_user: self.become_user.clone(),
        }
    }
}

/// Parses `-e` specifications into one variable mapping, later
/// specifications overriding earlier ones.
pub fn parse_extra_vars(specs: &[String]) -> anyhow::Result<IndexMap<String, Value>> {
    let mut vars = IndexMap::new();

    for spec in specs {
        if let Some(path) = spec.strip_prefix('@') {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading extra-vars file '{}'", path))?;
            let parsed: IndexMap<String, Value> = serde_yaml::from_str(&content)
                .with_context(|| format!("parsing extra-vars file '{}'", path))?;
            vars.extend(parsed);
        } else if spec.trim_start().starts_with('{') {
            let parsed: IndexMap<String, Value> = serde_json::from_str(spec)
                .with_context(|| format!("parsing extra-vars JSON '{}'", spec))?;
            vars.extend(parsed);
        } else if let Some((key, value)) = spec.split_once('=') {
            if key.is_empty() {
                bail!("extra-vars entry '{}' has an empty key", spec);
            }
            vars.insert(key.to_string(), Value::String(value.to_string()));
        } else {
            bail!(
                "extra-vars entry '{}' is not key=value, @file, or a JSON mapping",
                spec
            );
        }
    }

    Ok(vars)
}
