//! Styles for the catalog CLI.
//!
//! Styling is done in two layers. Rendering code asks for a *semantic* style (a name,
//! a price, a muted id) and never for a color. The semantic styles map onto a small
//! visual palette defined here, so changing the look means touching only this file.
//!
//! `console` drops the escape codes on its own when stdout is not a terminal or
//! `NO_COLOR` is set, which keeps test output plain.

use console::Style;

// Visual layer.

fn accent() -> Style {
    Style::new().cyan()
}

fn muted() -> Style {
    Style::new().dim()
}

fn good() -> Style {
    Style::new().green()
}

fn warn() -> Style {
    Style::new().yellow()
}

// Semantic layer.

/// Record names: categories, products, attributes.
pub fn name() -> Style {
    Style::new().bold()
}

/// Identifiers shown next to names.
pub fn id() -> Style {
    muted()
}

/// Slugs, skus and other human keys.
pub fn key() -> Style {
    accent()
}

pub fn price() -> Style {
    good()
}

pub fn ordinal() -> Style {
    warn()
}

pub fn inactive() -> Style {
    muted().italic()
}

pub fn heading() -> Style {
    Style::new().bold().underlined()
}

pub fn success() -> Style {
    good()
}

pub fn warning() -> Style {
    warn()
}

pub fn info() -> Style {
    muted()
}
