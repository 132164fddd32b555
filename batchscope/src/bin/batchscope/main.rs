mod commands;
mod context;
mod examples;
mod output;
mod theme;

use anyhow::Result;
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Color as ClapColor, RgbColor, Style},
    },
    error::ErrorKind,
};

use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use commands::{
    Session,
    comps::{CompsArgs, handle_comps},
    count::{CountArgs, handle_count},
    filters::{FiltersCommands, handle_filters_commands},
    list::{ListArgs, handle_list},
    lookup::{LookupArgs, handle_lookup},
    skip_trace::{SkipTraceArgs, handle_skip_trace},
};
use context::ExplorerContext;
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ARROW, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("BATCHDATA_API_TOKEN", "Bearer token for the BatchData API"),
    ("RUST_LOG", "Log filter for diagnostics, e.g. batchscope=debug"),
];

const TIP: &str = "Use 'batchscope <command> --help' to view examples, or --dry-run to print a request body.";

#[derive(Parser)]
#[command(name = "batchscope")]
#[command(version)]
#[command(
    about = "Explore the BatchData property API from the terminal",
    long_about = r#"Property search explorer for the BatchData API that provides:

• Filter criteria built from group.category:operator:value edits
• Property counts, paged lists and comparables
• Single-property lookup and owner skip trace

Commands:
  count       Count properties in a city
  list        Page through matching properties
  comps       Find comparables for a subject address
  lookup      Look up one property by address or APN
  skip-trace  Find owner contact details
  filters     Browse the filter catalog
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file (defaults to ./batchscope.toml when present)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// API token (overrides the config file)
    #[arg(long, env = "BATCHDATA_API_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn parse_with_styles() -> Self {
        let matches = match build_cli_command().try_get_matches() {
            Ok(matches) => matches,
            Err(err) => exit_with(err),
        };
        Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
    }
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Print clap's help, version or usage error padded by blank lines, then exit.
fn exit_with(err: clap::Error) -> ! {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print_padded(Stream::Stdout, || err.print());
            std::process::exit(0);
        }
        ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            print_padded(Stream::Stderr, || {
                let mut command = build_cli_command();
                eprintln!("error: '{}' requires a subcommand but one was not provided\n", command.get_name());
                let mut stderr = io::stderr();
                command.write_long_help(&mut stderr)?;
                writeln!(stderr)
            });
            std::process::exit(err.exit_code());
        }
        _ => {
            print_padded(Stream::Stderr, || err.print());
            std::process::exit(err.exit_code());
        }
    }
}

fn print_padded(stream: Stream, body: impl FnOnce() -> io::Result<()>) {
    blank_line(stream);
    if let Err(err) = body()
        && err.kind() != io::ErrorKind::BrokenPipe
    {
        eprintln!("Failed to write help: {err}");
    }
    blank_line(stream);
}

fn blank_line(stream: Stream) {
    let _ = match stream {
        Stream::Stdout => writeln!(io::stdout()),
        Stream::Stderr => writeln!(io::stderr()),
    };
}

fn build_cli_command() -> Command {
    let use_color = ShouldColorize::from_env().should_colorize();
    let mut command = Cli::command()
        .styles(help_styles())
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never })
        .after_long_help(render_top_level_appendix(use_color));

    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            *subcommand = subcommand
                .clone()
                .after_long_help(render_examples(example.groups, use_color));
        }
    }
    command
}

/// Help appendix text, colored only when the terminal supports it
struct HelpText {
    buffer: String,
    use_color: bool,
}

impl HelpText {
    fn new(use_color: bool) -> Self {
        Self {
            buffer: String::new(),
            use_color,
        }
    }

    fn heading(&mut self, text: &str) {
        self.line(0, &[(text, THEME.highlight, true)]);
    }

    /// One indented line of space-separated parts, each with its own color and weight.
    fn line(&mut self, indent: usize, parts: &[(&str, ThemeColor, bool)]) {
        self.buffer.push_str(&" ".repeat(indent));
        for (index, &(text, color, bold)) in parts.iter().enumerate() {
            if index > 0 {
                self.buffer.push(' ');
            }
            let painted = self.paint(text, color, bold);
            self.buffer.push_str(&painted);
        }
        self.buffer.push('\n');
    }

    fn blank(&mut self) {
        self.buffer.push('\n');
    }

    fn paint(&self, text: &str, color: ThemeColor, bold: bool) -> String {
        match (self.use_color, bold) {
            (false, _) => text.to_string(),
            (true, false) => text.color(color).to_string(),
            (true, true) => text.color(color).bold().to_string(),
        }
    }

    fn finish(self) -> String {
        self.buffer
    }
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut help = HelpText::new(use_color);
    help.heading("Examples:");
    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            help.blank();
        }
        help.line(2, &[(group.title, THEME.primary, true)]);
        for &command in group.commands {
            help.line(4, &[(ARROW, THEME.secondary, false), (command, THEME.secondary, false)]);
        }
    }
    help.finish()
}

fn render_top_level_appendix(use_color: bool) -> String {
    let mut help = HelpText::new(use_color);
    help.heading("Environment Variables:");
    for &(key, description) in ENVIRONMENT_VARIABLES {
        help.line(2, &[(key, THEME.key, true), (description, THEME.value, false)]);
    }
    help.blank();
    help.line(0, &[("Tip:", THEME.highlight, true), (TIP, THEME.secondary, false)]);
    help.finish()
}

fn help_styles() -> Styles {
    let style = |color: ThemeColor| Style::new().fg_color(Some(clap_color(color)));
    Styles::styled()
        .usage(style(THEME.primary).bold())
        .header(style(THEME.highlight).bold())
        .literal(style(THEME.secondary))
        .placeholder(style(THEME.muted))
        .valid(style(THEME.success))
        .invalid(style(THEME.warning))
        .error(style(THEME.error).bold())
}

fn clap_color(color: ThemeColor) -> ClapColor {
    let ansi = match color {
        ThemeColor::TrueColor { r, g, b } => return ClapColor::Rgb(RgbColor(r, g, b)),
        ThemeColor::Black => AnsiColor::Black,
        ThemeColor::Red => AnsiColor::Red,
        ThemeColor::Green => AnsiColor::Green,
        ThemeColor::Yellow => AnsiColor::Yellow,
        ThemeColor::Blue => AnsiColor::Blue,
        ThemeColor::Magenta => AnsiColor::Magenta,
        ThemeColor::Cyan => AnsiColor::Cyan,
        ThemeColor::White => AnsiColor::White,
        ThemeColor::BrightBlack => AnsiColor::BrightBlack,
        ThemeColor::BrightRed => AnsiColor::BrightRed,
        ThemeColor::BrightGreen => AnsiColor::BrightGreen,
        ThemeColor::BrightYellow => AnsiColor::BrightYellow,
        ThemeColor::BrightBlue => AnsiColor::BrightBlue,
        ThemeColor::BrightMagenta => AnsiColor::BrightMagenta,
        ThemeColor::BrightCyan => AnsiColor::BrightCyan,
        ThemeColor::BrightWhite => AnsiColor::BrightWhite,
    };
    ClapColor::Ansi(ansi)
}

#[derive(Subcommand)]
enum Commands {
    /// Count properties in a city, with per-quicklist counts
    Count(CountArgs),

    /// Page through properties in a city
    List(ListArgs),

    /// Find comparables for a subject address
    Comps(Box<CompsArgs>),

    /// Look up one property by address or APN
    Lookup(LookupArgs),

    /// Find owner contact details for a property
    #[command(name = "skip-trace")]
    SkipTrace(SkipTraceArgs),

    /// Browse criteria groups, categories, codes and quicklists
    #[command(subcommand)]
    Filters(FiltersCommands),
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse_with_styles();

    if cli.no_color {
        colored::control::set_override(false);
    }

    blank_line(Stream::Stdout);

    let result = execute(cli).await;
    if let Err(err) = &result {
        eprintln!("Error: {err:#}");
    }
    blank_line(Stream::Stdout);
    if result.is_err() {
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let global_options = GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    let output = OutputManager::new(global_options);
    let Cli {
        command, config, token, ..
    } = cli;

    match command {
        Commands::Count(args) => {
            let session = open_session(config.as_deref(), token, &output)?;
            handle_count(args, &session, &output).await?;
        }
        Commands::List(args) => {
            let session = open_session(config.as_deref(), token, &output)?;
            handle_list(args, &session, &output).await?;
        }
        Commands::Comps(args) => {
            let session = open_session(config.as_deref(), token, &output)?;
            handle_comps(*args, &session, &output).await?;
        }
        Commands::Lookup(args) => {
            let session = open_session(config.as_deref(), token, &output)?;
            handle_lookup(args, &session, &output).await?;
        }
        Commands::SkipTrace(args) => {
            let session = open_session(config.as_deref(), token, &output)?;
            handle_skip_trace(args, &session, &output).await?;
        }
        Commands::Filters(filters_cmd) => {
            handle_filters_commands(filters_cmd, &output).await?;
        }
    }

    Ok(())
}

/// Load the config and open a session for the commands that talk to the API
fn open_session(config: Option<&Path>, token: Option<String>, output: &OutputManager) -> Result<Session> {
    let context = ExplorerContext::load(config)?;
    match &context.config_path {
        Some(path) => output.verbose(&format!("Using config {}", path.display())),
        None => output.verbose("No config file, using defaults"),
    }
    Ok(Session::new(context, token))
}
