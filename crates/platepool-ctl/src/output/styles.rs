//! Palette for status lines and `--help`.

use anstyle::{AnsiColor, Effects, Style};

/// Template parsed or command finished.
pub(crate) const SUCCESS: Style = AnsiColor::Green.on_default();

/// Template failed to parse or render.
pub(crate) const ERROR: Style = AnsiColor::Red.on_default();

pub(crate) const WARNING: Style = AnsiColor::Yellow.on_default();

/// "Templates:" / "Layouts:" headings in `list`.
pub(crate) const HEADER: Style = Style::new().effects(Effects::BOLD);

/// Error causes under a failed template.
pub(crate) const DIM: Style = Style::new().effects(Effects::DIMMED);

pub(crate) fn clap_styles() -> clap::builder::Styles {
    let accent = AnsiColor::Magenta.on_default().effects(Effects::BOLD);
    clap::builder::Styles::styled()
        .header(accent)
        .usage(accent)
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Cyan.on_default().effects(Effects::ITALIC))
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
}
