//! Config file discovery and loading for `.platepool.toml`.
//!
//! Checks two locations in precedence order:
//! 1. `./.platepool.toml` (project-local)
//! 2. `~/.config/platepool.toml` (user-global)

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use super::CliConfig;

const CONFIG_FILENAME: &str = ".platepool.toml";
const GLOBAL_CONFIG_FILENAME: &str = "platepool.toml";

/// Config from the first existing candidate, or defaults.
///
/// A candidate that exists but cannot be read or parsed is reported and the
/// defaults are used; later candidates are not consulted.
pub(crate) fn load_cli_config() -> CliConfig {
    let Some(path) = candidates().into_iter().find(|p| p.is_file()) else {
        return CliConfig::default();
    };
    match read_config(&path) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), layouts = config.layouts.len(), "Loaded CLI config");
            config
        }
        Err(e) => {
            let error = format!("{e:#}");
            tracing::warn!(path = %path.display(), %error, "Ignoring CLI config");
            CliConfig::default()
        }
    }
}

/// Locations searched, highest precedence first.
fn candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILENAME)];
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(
            PathBuf::from(home)
                .join(".config")
                .join(GLOBAL_CONFIG_FILENAME),
        );
    }
    paths
}

fn read_config(path: &Path) -> anyhow::Result<CliConfig> {
    let contents = std::fs::read_to_string(path).context("unreadable")?;
    toml::from_str(&contents).context("invalid TOML")
}
