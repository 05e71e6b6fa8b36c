//! purpose: Configuration file parsing for docsync.toml. Handles exclusion patterns,
//!     the store directory, and the container alias table used by identifier resolution.
//!
//! when-editing:
//!     - !Config is loaded once at startup and passed through the call chain
//!     - !Alias entries map a source container name to the public name its members are
//!       documented under (mixin-style interfaces re-exported via a public surface)
//!
//! invariants:
//!     - Config::load returns default config if docsync.toml doesn't exist
//!     - A malformed config file warns and falls back to defaults rather than failing
//!
//! gotchas:
//!     - Exclude patterns are matched against paths relative to the project root

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main configuration structure matching docsync.toml
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exclusion patterns (gitignore-style)
    pub exclude: Vec<String>,

    /// Directory holding the YAML document store, relative to the root
    pub store_dir: String,

    /// Container alias table: source container name -> public container name
    pub aliases: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            store_dir: "docs-db".to_string(),
            aliases: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from docsync.toml in the given root directory
    pub fn load(root: &Path) -> Self {
        let config_path = root.join("docsync.toml");

        if !config_path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&config_path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse docsync.toml: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read docsync.toml: {}", e);
                Self::default()
            }
        }
    }
}
