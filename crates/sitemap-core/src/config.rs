//! Engine configuration
//!
//! Consumed by the engine, owned by the embedding process. The process
//! decides where the values come from (environment, file, flags); this
//! module only defines the shape and the TOML loading path.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

const DEFAULT_QUIET_WINDOW_MS: u64 = 1_000;

/// Configuration for one sitemap manager instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapConfig {
    /// Scope (guild/server) whose channel tree is indexed
    pub scope_id: String,

    /// Container whose direct children are the generated index entries
    pub index_root_id: String,

    /// Containers excluded from indexing even when non-empty
    #[serde(default)]
    pub excluded_containers: HashSet<String>,

    /// Quiet window between the last notification and the pass, in
    /// milliseconds
    #[serde(default = "default_quiet_window_ms")]
    pub quiet_window_ms: u64,

    /// Category-name preprocessing applied before normalization
    #[serde(default)]
    pub naming: NamingOverrides,
}

/// Naming overrides for decorated category names
///
/// Some servers prefix category names with emoji and a separator
/// (`🌱｜general`). The override strips the decoration so the entry name
/// derives from the real name only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamingOverrides {
    /// When set, everything up to and including the first occurrence of
    /// this separator is dropped from the category name.
    #[serde(default)]
    pub strip_through: Option<char>,
}

fn default_quiet_window_ms() -> u64 {
    DEFAULT_QUIET_WINDOW_MS
}

impl SitemapConfig {
    /// Minimal configuration: just the scope and the index root.
    pub fn new(scope_id: impl Into<String>, index_root_id: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            index_root_id: index_root_id.into(),
            excluded_containers: HashSet::new(),
            quiet_window_ms: DEFAULT_QUIET_WINDOW_MS,
            naming: NamingOverrides::default(),
        }
    }

    /// Parse a configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// The debounce quiet window as a [`Duration`].
    pub fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.quiet_window_ms)
    }
}
