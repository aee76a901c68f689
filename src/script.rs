//! SQL script assets read from disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, SeederError};

/// The two named scripts a run can push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    /// Table, function and policy definitions.
    Schema,
    /// Initial rows.
    Seed,
}

impl ScriptKind {
    /// Every kind, in execution order.
    pub const ALL: [ScriptKind; 2] = [ScriptKind::Schema, ScriptKind::Seed];

    /// Returns the kind as used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Seed => "seed",
        }
    }

    /// Human-readable asset name for log lines.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Seed => "seed data",
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ScriptKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "schema" => Ok(Self::Schema),
            "seed" | "data" => Ok(Self::Seed),
            _ => Err(format!("Invalid script: {s}. Expected: schema or seed")),
        }
    }
}

/// A script read once from disk and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Script {
    kind: ScriptKind,
    path: PathBuf,
    text: String,
}

impl Script {
    /// Wraps already-loaded text.
    pub fn new(kind: ScriptKind, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            text: text.into(),
        }
    }

    /// Reads a script from `path`. Any I/O failure is a source error.
    pub fn load(kind: ScriptKind, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SeederError::script_source(format!(
                "Failed to read {} from {}: {e}",
                kind.display_name(),
                path.display()
            ))
        })?;
        Ok(Self::new(kind, path, text))
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters, as compared against the split threshold.
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }
}

/// Loads every requested script, failing on the first unreadable one.
pub fn load_all(targets: &[(ScriptKind, PathBuf)]) -> Result<Vec<Script>> {
    targets
        .iter()
        .map(|(kind, path)| Script::load(*kind, path))
        .collect()
}
