//! Pool configuration: content root, reload policy and diagnostics verbosity.
//!
//! Loadable from TOML (kebab-case keys) or built in code:
//!
//! ```
//! use platepool::{PoolConfig, ReloadVerbosity};
//!
//! let config = PoolConfig::builder()
//!     .content_root("templates")
//!     .auto_reload(true)
//!     .reload_verbosity(ReloadVerbosity::Verbose)
//!     .build();
//! assert_eq!(config.extension, "tmpl.html");
//! ```

use std::path::{Path, PathBuf};

use bon::Builder;
use serde::Deserialize;

use crate::error::ConfigError;

/// Suffix appended to a logical name to find its source file.
pub const DEFAULT_EXTENSION: &str = "tmpl.html";

fn default_content_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_true() -> bool {
    true
}

/// How much the passive reload path reports through `tracing`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReloadVerbosity {
    /// Nothing is emitted, not even failed reloads.
    Quiet,
    /// Failed reloads are reported at `warn`.
    #[default]
    Normal,
    /// Also reports detected changes and templates with nothing to probe.
    Verbose,
}

impl ReloadVerbosity {
    pub fn reports_failures(self) -> bool {
        self != Self::Quiet
    }

    pub fn reports_changes(self) -> bool {
        self == Self::Verbose
    }
}

/// Settings fixed for the lifetime of a [`Pool`](crate::Pool).
#[derive(Debug, Clone, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct PoolConfig {
    /// Directory holding `<name>.<extension>` source files.
    #[serde(default = "default_content_root")]
    #[builder(into, default = default_content_root())]
    pub content_root: PathBuf,

    /// Probe artifacts for changes before every render.
    #[serde(default)]
    #[builder(default)]
    pub auto_reload: bool,

    /// File suffix, without the leading dot. Default: `tmpl.html`.
    #[serde(default = "default_extension")]
    #[builder(into, default = default_extension())]
    pub extension: String,

    #[serde(default)]
    #[builder(default)]
    pub reload_verbosity: ReloadVerbosity,

    /// HTML-escape expression output in every template, whatever its name.
    #[serde(default = "default_true")]
    #[builder(default = true)]
    pub autoescape: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PoolConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a config file. Relative `content-root` values are kept as written.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(?path, root = %config.content_root.display(), "Loaded pool config");
        Ok(config)
    }

    /// Conventional source path for a logical template name.
    pub fn source_path(&self, name: &str) -> PathBuf {
        self.content_root
            .join(format!("{}.{}", name, self.extension))
    }
}
