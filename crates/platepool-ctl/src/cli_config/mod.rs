//! CLI configuration: pool settings and named layouts for a content directory.

pub(crate) mod loader;

pub(crate) use loader::load_cli_config;

use std::collections::BTreeMap;

use platepool::PoolConfig;
use serde::Deserialize;

/// Header and footer names making up one layout.
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct LayoutConfig {
    pub header: String,
    pub footer: String,
}

/// Contents of `.platepool.toml`.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct CliConfig {
    /// Pool settings; the `--root` flag overrides `content-root`.
    pub pool: Option<PoolConfig>,

    /// Layouts available to `render --layout <name>`.
    #[serde(default)]
    pub layouts: BTreeMap<String, LayoutConfig>,
}
