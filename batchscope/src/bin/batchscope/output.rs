use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Table, presets};
use serde::Serialize;
use std::io::Write;

use crate::theme::{BULLET, THEME, Tone};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Result views that render as a table or a single line
pub trait TableDisplay {
    fn to_table(&self, output: &OutputManager) -> Table;
    fn to_compact(&self) -> String;
}

pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    pub fn is_json(&self) -> bool {
        self.options.output_format == OutputFormat::Json
    }

    fn decorates(&self) -> bool {
        !self.options.quiet && !self.is_json()
    }

    /// Print a result view in the configured format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
            OutputFormat::Table => println!("{}", data.to_table(self)),
            OutputFormat::Compact => println!("{}", data.to_compact()),
        }
        Ok(())
    }

    /// Print a JSON document regardless of the output format.
    ///
    /// Request bodies are always shown as JSON; compact mode prints them on one line.
    pub fn json<T: Serialize + ?Sized>(&self, data: &T) -> Result<()> {
        if self.options.quiet {
            return Ok(());
        }
        let json = if self.options.output_format == OutputFormat::Compact {
            serde_json::to_string(data)?
        } else {
            serde_json::to_string_pretty(data)?
        };
        println!("{json}");
        Ok(())
    }

    fn status_line(&self, tone: Tone, message: &str) -> String {
        if self.options.no_color {
            format!("{} {message}", tone.glyph())
        } else {
            format!("{} {}", tone.glyph().color(tone.color()), message.color(tone.color()))
        }
    }

    fn status(&self, tone: Tone, message: &str) {
        let line = self.status_line(tone, message);
        if tone.to_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    pub fn success(&self, message: &str) {
        if !self.options.quiet {
            self.status(Tone::Success, message);
        }
    }

    /// Warnings survive JSON mode since they go to stderr.
    pub fn warning(&self, message: &str) {
        if !self.options.quiet {
            self.status(Tone::Warning, message);
        }
    }

    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            self.status(Tone::Detail, message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.decorates() {
            self.status(Tone::Info, message);
        }
    }

    pub fn heading(&self, text: &str) {
        if !self.decorates() {
            return;
        }
        if self.options.no_color {
            println!("\n{text}\n{}", "=".repeat(text.chars().count()));
        } else {
            println!("\n{}", text.color(THEME.primary).bold());
        }
    }

    pub fn key_value(&self, key: &str, value: &str) {
        if !self.decorates() {
            return;
        }
        if self.options.no_color {
            println!("{key}: {value}");
        } else {
            println!("{}: {}", key.color(THEME.key).bold(), value.color(THEME.value));
        }
    }

    pub fn bullet(&self, text: &str) {
        if !self.decorates() {
            return;
        }
        let bullet = if self.options.no_color {
            BULLET.to_string()
        } else {
            BULLET.color(THEME.muted).to_string()
        };
        println!("  {bullet} {text}");
    }

    pub fn create_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(if self.options.no_color {
            presets::ASCII_FULL
        } else {
            presets::UTF8_FULL_CONDENSED
        });
        table
    }

    pub fn add_table_header(&self, table: &mut Table, headers: &[&str]) {
        table.set_header(headers.iter().map(|header| {
            let cell = Cell::new(header).add_attribute(Attribute::Bold);
            if self.options.no_color { cell } else { cell.fg(THEME.table_header) }
        }));
    }

    /// Value cell that turns bold red when the flag is raised, e.g. a TCPA litigator.
    pub fn alert_cell(&self, text: impl ToString, raised: bool) -> Cell {
        let cell = Cell::new(text.to_string());
        match (raised, self.options.no_color) {
            (false, _) => cell,
            (true, true) => cell.add_attribute(Attribute::Bold),
            (true, false) => cell.add_attribute(Attribute::Bold).fg(THEME.table_alert),
        }
    }

    /// Transient line shown while a request is in flight; table mode only.
    pub fn progress(&self, message: &str) {
        if self.options.quiet || self.options.output_format != OutputFormat::Table {
            return;
        }
        print!("\r{}...", self.status_line(Tone::Working, message));
        std::io::stdout().flush().ok();
    }

    pub fn clear_line(&self) {
        if self.options.quiet || self.options.output_format != OutputFormat::Table {
            return;
        }
        print!("\r{}\r", " ".repeat(80));
        std::io::stdout().flush().ok();
    }
}
