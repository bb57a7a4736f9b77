//! Command handlers.

mod check;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use platepool::{PoolConfig, ReloadVerbosity};

use crate::cli_config::CliConfig;
use crate::{Cli, Commands};

pub(crate) fn dispatch(cli: Cli, cli_config: &CliConfig) -> anyhow::Result<ExitCode> {
    let config = pool_config(cli_config, cli.root, cli.verbose);
    match cli.command {
        Commands::Render {
            template,
            layout,
            header,
            footer,
            fragment,
            data,
            sources,
            left_delim,
            right_delim,
        } => render::render_template(
            config,
            cli_config,
            render::RenderArgs {
                template,
                layout,
                header,
                footer,
                fragment,
                data,
                sources,
                delimiters: platepool::Delimiters::new(
                    left_delim.unwrap_or_default(),
                    right_delim.unwrap_or_default(),
                ),
            },
        ),
        Commands::Check => check::check_templates(config),
        Commands::List => check::list_templates(&config, cli_config),
    }
}

/// Pool settings from the config file, with command-line overrides applied.
fn pool_config(cli_config: &CliConfig, root: Option<PathBuf>, verbose: u8) -> PoolConfig {
    let mut config = cli_config.pool.clone().unwrap_or_default();
    if let Some(root) = root {
        config.content_root = root;
    }
    if verbose > 0 {
        config.reload_verbosity = ReloadVerbosity::Verbose;
    }
    config
}

/// Logical names of every `*.<extension>` file directly under `root`, sorted.
fn discover_templates(root: &Path, extension: &str) -> anyhow::Result<Vec<String>> {
    let suffix = format!(".{extension}");
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("cannot read content directory {}", root.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        if let Some(name) = file_name.to_string_lossy().strip_suffix(&suffix) {
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
