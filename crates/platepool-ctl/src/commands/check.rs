//! `check` and `list`: whole-directory operations.

use std::error::Error as _;
use std::process::ExitCode;

use platepool::{Delimiters, Pool, PoolConfig};

use super::discover_templates;
use crate::cli_config::CliConfig;
use crate::output;

/// Register every template under the content root, reporting each failure.
pub(crate) fn check_templates(config: PoolConfig) -> anyhow::Result<ExitCode> {
    let names = discover_templates(&config.content_root, &config.extension)?;
    if names.is_empty() {
        output::warning(format!(
            "No *.{} templates found in {}",
            config.extension,
            config.content_root.display()
        ));
        return Ok(ExitCode::SUCCESS);
    }

    let mut pool = Pool::with_config(config);
    let mut failures = 0usize;
    for name in &names {
        match pool.register(name, &Delimiters::standard()) {
            Ok(()) => output::success(name),
            Err(e) => {
                failures += 1;
                output::error(format!("{name}: {e}"));
                let mut source = e.source();
                while let Some(cause) = source {
                    output::dim(format!("    caused by: {cause}"));
                    source = cause.source();
                }
            }
        }
    }

    if failures > 0 {
        output::error(format!("{failures} of {} templates failed to parse", names.len()));
        Ok(ExitCode::FAILURE)
    } else {
        output::success(format!("All {} templates parsed", names.len()));
        Ok(ExitCode::SUCCESS)
    }
}

/// Print the templates under the content root and the configured layouts.
pub(crate) fn list_templates(
    config: &PoolConfig,
    cli_config: &CliConfig,
) -> anyhow::Result<ExitCode> {
    let names = discover_templates(&config.content_root, &config.extension)?;
    if names.is_empty() {
        output::warning(format!(
            "No *.{} templates found in {}",
            config.extension,
            config.content_root.display()
        ));
    } else {
        output::header("Templates:");
        for name in &names {
            output::item(name);
        }
    }

    if !cli_config.layouts.is_empty() {
        output::header("Layouts:");
        for (name, layout) in &cli_config.layouts {
            output::item(format!("{name} ({} + {})", layout.header, layout.footer));
        }
    }

    Ok(ExitCode::SUCCESS)
}
