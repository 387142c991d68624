//! Purpose: `dbus-tool` CLI entry point.
//! Role: Binary crate root; parses args, builds typed bus messages, emits JSON on stdout.
//! Invariants: Commands emit stable stdout formats (human tree on a terminal, JSON otherwise).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Argument text reaches the bus layer only as parsed `Value`s.
use std::ffi::OsString;
use std::io::{self, IsTerminal};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value as Json, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod value_tree;

use dbus_tool::api::{BusOptions, BusSelection, Error, ErrorKind, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(std::env::args_os().collect::<Vec<OsString>>()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `dbus-tool --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    let options = bus_options(cli.system, cli.bus, cli.timeout);
    command_dispatch::dispatch_command(cli.command, options, color_mode)
        .map_err(|err| (err, color_mode))
}

fn bus_options(system: bool, address: Option<String>, timeout_ms: Option<u32>) -> BusOptions {
    let bus = match address {
        Some(address) => BusSelection::Address { address },
        None if system => BusSelection::System,
        None => BusSelection::Session,
    };
    BusOptions { bus, timeout_ms }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "dbus-tool",
    version,
    about = "Call methods, send signals, and set properties on a D-Bus message bus",
    long_about = r#"Call methods, send signals, and set properties on a D-Bus message bus.

Messages are built and validated locally, then written as JSON envelopes on
stdout for the bus transport to deliver."#,
    after_help = r#"ARGUMENTS
  Method and signal arguments are `signature value` pairs:
    $ dbus-tool call org.example.App / org.example.App Add i 1 i 2
    $ dbus-tool call org.example.App / org.example.App Store 'a{sv}' '[{"k",i_1}]'

  Value syntax:
    numbers       42  -7  2.5e3          booleans   true false 1 0
    strings       "text"  'text'          arrays     [1,2,3]
    structs       (1,"a")                 dicts      [{"key",value}]
    variants      <signature>_<value>, e.g. i_32  s_"hi"  ai_[1,2]

  A single argument may omit its signature: true/false become booleans,
  decimal integers become int32, anything else a string."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(short = 'y', long, help = "Use the system bus instead of the session bus")]
    system: bool,
    #[arg(
        short = 'b',
        long,
        value_name = "ADDRESS",
        help = "Connect to a specific bus address (overrides --system)"
    )]
    bus: Option<String>,
    #[arg(
        short = 't',
        long,
        value_name = "MILLISECONDS",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Reply timeout in milliseconds"
    )]
    timeout: Option<u32>,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and terminal output: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Call a method on an object in a bus service",
        after_help = r#"EXAMPLES
  $ dbus-tool call org.freedesktop.DBus /org/freedesktop/DBus org.freedesktop.DBus GetNameOwner s '"org.freedesktop.DBus"'
  $ dbus-tool call org.example.App / org.example.App Echo hello"#
    )]
    Call {
        service: String,
        object_path: String,
        interface: String,
        method: String,
        #[arg(
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "SIGNATURE VALUE",
            help = "Method arguments as `signature value` pairs"
        )]
        args: Vec<String>,
    },
    #[command(
        about = "Send a signal from a service name",
        after_help = r#"EXAMPLES
  $ dbus-tool signal org.example.App /org/example org.example.App Changed s '"volume"' u 42"#
    )]
    Signal {
        service: String,
        object_path: String,
        interface: String,
        signal: String,
        #[arg(
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "SIGNATURE VALUE",
            help = "Signal arguments as `signature value` pairs"
        )]
        args: Vec<String>,
    },
    #[command(
        about = "Set a property of an object in a bus service",
        after_help = r#"EXAMPLES
  $ dbus-tool set org.example.App / org.example.App Volume u 42
  $ dbus-tool set org.example.App / org.example.App Muted true"#
    )]
    Set {
        service: String,
        object_path: String,
        interface: String,
        property: String,
        #[arg(
            required = true,
            num_args = 1..=2,
            allow_hyphen_values = true,
            value_name = "[SIGNATURE] VALUE"
        )]
        value: Vec<String>,
    },
    #[command(
        about = "Parse one argument offline and show the typed value",
        after_help = r#"EXAMPLES
  $ dbus-tool parse 'a{sv}' '[{"name",s_"x"},{"size",u_3}]'
  $ dbus-tool parse '(is)' '(1,"a")' --json"#
    )]
    Parse {
        signature: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
        #[arg(long, help = "Emit JSON even on a terminal")]
        json: bool,
    },
    #[command(about = "Check whether a type signature is valid")]
    Check {
        signature: String,
        #[arg(long, help = "Also accept a bare dict entry such as {sv}")]
        dict_entry: bool,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn emit_json(value: Json) {
    let is_tty = io::stdout().is_terminal();
    let json = if is_tty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Signature => "invalid signature".to_string(),
        ErrorKind::Literal => "invalid literal".to_string(),
        ErrorKind::Structural => "malformed value".to_string(),
        ErrorKind::Semantic => "invalid value".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Json {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(offset) = err.signature_offset() {
        inner.insert("signature_offset".to_string(), json!(offset));
    }
    if let Some(offset) = err.text_offset() {
        inner.insert("text_offset".to_string(), json!(offset));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Json::Object(inner));
    Json::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(offset) = err.text_offset() {
        lines.push(format!(
            "{} {offset}",
            colorize_label("text offset:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(offset) = err.signature_offset() {
        lines.push(format!(
            "{} {offset}",
            colorize_label("signature offset:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
