//! Command-line argument parsing for the seeder.
//!
//! Uses clap to parse CLI arguments. Values given here override the config file.

use crate::config::Config;
use crate::script::ScriptKind;
use clap::Parser;
use std::path::PathBuf;

/// Split SQL schema and seed scripts and push them to a remote SQL execution endpoint.
#[derive(Parser, Debug)]
#[command(name = "sql-seeder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the SQL execution endpoint
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Project reference sent with every request
    #[arg(short = 'p', long, value_name = "REF")]
    pub project_ref: Option<String>,

    /// Schema script path
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Seed data script path
    #[arg(long, value_name = "PATH")]
    pub seed: Option<PathBuf>,

    /// Config file path
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run only one script (schema or seed)
    #[arg(long, value_name = "SCRIPT")]
    pub only: Option<ScriptKind>,

    /// Split scripts longer than this many characters
    #[arg(long, value_name = "CHARS")]
    pub threshold: Option<usize>,

    /// Skip the /health probe before each batch
    #[arg(long)]
    pub no_health_check: bool,

    /// Split the scripts and list the statements without sending anything
    #[arg(long)]
    pub dry_run: bool,

    /// Write logs to a file (default location if no path is given)
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub log_file: Option<Option<PathBuf>>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Overrides config values with those given on the command line.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.endpoint.base_url = Some(base_url.clone());
        }
        if let Some(project_ref) = &self.project_ref {
            config.endpoint.project_ref = Some(project_ref.clone());
        }
        if let Some(schema) = &self.schema {
            config.scripts.schema = schema.clone();
        }
        if let Some(seed) = &self.seed {
            config.scripts.seed = seed.clone();
        }
        if let Some(threshold) = self.threshold {
            config.execution.split_threshold = threshold;
        }
        if self.no_health_check {
            config.execution.health_check = false;
        }
    }

    /// Scripts to run, in execution order.
    pub fn targets(&self, config: &Config) -> Vec<(ScriptKind, PathBuf)> {
        ScriptKind::ALL
            .into_iter()
            .filter(|kind| self.only.map_or(true, |only| only == *kind))
            .map(|kind| {
                let path = match kind {
                    ScriptKind::Schema => config.scripts.schema.clone(),
                    ScriptKind::Seed => config.scripts.seed.clone(),
                };
                (kind, path)
            })
            .collect()
    }

    /// Log file path, if file logging was requested.
    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.log_file
            .as_ref()
            .map(|path| path.clone().unwrap_or_else(crate::logging::get_log_path))
    }
}
