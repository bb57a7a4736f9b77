//! `render`: register one template (and optionally a layout) and render it to stdout.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context as _};
use platepool::{Delimiters, Pool, PoolConfig};

use crate::cli_config::{CliConfig, LayoutConfig};

#[derive(Debug)]
pub(crate) struct RenderArgs {
    pub template: String,
    pub layout: Option<String>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub fragment: Option<String>,
    pub data: Option<PathBuf>,
    pub sources: Vec<String>,
    pub delimiters: Delimiters,
}

pub(crate) fn render_template(
    config: PoolConfig,
    cli_config: &CliConfig,
    args: RenderArgs,
) -> anyhow::Result<ExitCode> {
    let mut pool = Pool::with_config(config);

    if let Some(layout) = &args.layout {
        let binding = resolve_layout(cli_config, layout, &args)?;
        pool.register_layout(layout, &binding.header, &binding.footer, &args.delimiters)?;
    }
    if args.sources.is_empty() {
        pool.register(&args.template, &args.delimiters)?;
    } else {
        pool.register_multi_source(&args.template, &args.sources, &args.delimiters)?;
    }

    let data = load_data(args.data.as_deref())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match (&args.layout, &args.fragment) {
        (Some(layout), Some(fragment)) => {
            pool.render_fragment(layout, &args.template, fragment, &data, &mut out)?
        }
        (Some(layout), None) => pool.render(layout, &args.template, &data, &mut out)?,
        (None, _) => pool.render_no_layout(&args.template, &data, &mut out)?,
    }
    out.flush()?;

    Ok(ExitCode::SUCCESS)
}

/// Header/footer names from the flags, falling back to `[layouts.<name>]`.
fn resolve_layout(
    cli_config: &CliConfig,
    layout: &str,
    args: &RenderArgs,
) -> anyhow::Result<LayoutConfig> {
    let configured = cli_config.layouts.get(layout);
    let header = args
        .header
        .clone()
        .or_else(|| configured.map(|l| l.header.clone()));
    let footer = args
        .footer
        .clone()
        .or_else(|| configured.map(|l| l.footer.clone()));

    match (header, footer) {
        (Some(header), Some(footer)) => Ok(LayoutConfig { header, footer }),
        _ => Err(anyhow!(
            "layout '{layout}' is not configured; pass --header and --footer or add [layouts.{layout}] to .platepool.toml"
        )),
    }
}

fn load_data(path: Option<&std::path::Path>) -> anyhow::Result<serde_json::Value> {
    let Some(path) = path else {
        return Ok(serde_json::Value::Null);
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read data file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("data file {} is not valid JSON", path.display()))
}
