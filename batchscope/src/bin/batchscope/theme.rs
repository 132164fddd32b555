//! Colors and glyphs for terminal output.

use colored::Color;
use comfy_table::Color as TableColor;
use once_cell::sync::Lazy;

pub const ARROW: &str = "→";
pub const BULLET: &str = "•";

/// Palette shared by help text, status lines and tables
pub struct Palette {
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    pub highlight: Color,
    pub muted: Color,
    pub primary: Color,
    pub secondary: Color,
    pub key: Color,
    pub value: Color,
    pub table_header: TableColor,
    /// Cells that flag contact risk: litigators, DNC listings, deceased owners
    pub table_alert: TableColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
            highlight: Color::Cyan,
            muted: Color::BrightBlack,
            primary: Color::BrightBlue,
            secondary: Color::Magenta,
            key: Color::BrightCyan,
            value: Color::White,
            table_header: TableColor::Cyan,
            table_alert: TableColor::Red,
        }
    }
}

pub static THEME: Lazy<Palette> = Lazy::new(Palette::default);

/// Kind of status line printed around command results
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Info,
    /// Verbose-only details such as endpoints and config paths
    Detail,
    /// Transient "request in flight" line, cleared when the response lands
    Working,
}

impl Tone {
    pub fn glyph(self) -> &'static str {
        match self {
            Tone::Success => "✓",
            Tone::Warning => "⚠",
            Tone::Info => "ℹ",
            Tone::Detail => ARROW,
            Tone::Working => "⟳",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Tone::Success => THEME.success,
            Tone::Warning => THEME.warning,
            Tone::Info => THEME.info,
            Tone::Detail => THEME.muted,
            Tone::Working => THEME.highlight,
        }
    }

    /// Warnings and details go to stderr so piped JSON stays clean.
    pub fn to_stderr(self) -> bool {
        matches!(self, Tone::Warning | Tone::Detail)
    }
}
