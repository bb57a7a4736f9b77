//! platepool-ctl
//!
//! Renders and checks the templates of a content directory from the command
//! line, using the same pool, layouts and helpers an embedding service would.

mod cli_config;
mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "platepool-ctl",
    version,
    about = "Render and check platepool template directories",
    styles = output::clap_styles()
)]
pub(crate) struct Cli {
    /// Directory holding template sources (overrides the config file)
    #[arg(long, global = true, env = "PLATEPOOL_ROOT")]
    pub root: Option<PathBuf>,

    /// Enable debug logging, including reload diagnostics
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Render a template to stdout
    Render {
        /// Logical template name (`<root>/<name>.<extension>`)
        template: String,

        /// Layout to wrap the template in
        #[arg(long)]
        layout: Option<String>,

        /// Header template for --layout (otherwise taken from the config file)
        #[arg(long, requires = "layout")]
        header: Option<String>,

        /// Footer template for --layout (otherwise taken from the config file)
        #[arg(long, requires = "layout")]
        footer: Option<String>,

        /// Render only this named source of the template
        #[arg(long, requires = "layout")]
        fragment: Option<String>,

        /// JSON file with the render data
        #[arg(long)]
        data: Option<PathBuf>,

        /// Sources making up the template, root first (repeatable)
        #[arg(long = "source")]
        sources: Vec<String>,

        /// Custom opening expression delimiter
        #[arg(long, requires = "right_delim")]
        left_delim: Option<String>,

        /// Custom closing expression delimiter
        #[arg(long, requires = "left_delim")]
        right_delim: Option<String>,
    },

    /// Parse every template in the content directory and report failures
    Check,

    /// List the templates found in the content directory
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cli_config = cli_config::load_cli_config();
    match commands::dispatch(cli, &cli_config) {
        Ok(code) => code,
        Err(e) => {
            output::error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = if verbose > 0 {
        "platepool=debug,platepool_ctl=debug"
    } else {
        "platepool=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
