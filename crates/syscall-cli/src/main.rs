use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use syscall_core::parser::tokenizer;
use syscall_core::{Call, Command};
use tracing_subscriber::EnvFilter;

/// System Call - natural-language command grammar CLI
///
/// Tokenize call input, compile command formats and resolve calls against
/// a command file.
#[derive(Parser)]
#[command(name = "syscall", version, about, long_about = None)]
struct Cli {
    /// Log resolution details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split call input into token lists, one per call
    Tokenize {
        /// Call input
        input: String,
    },

    /// Compile a command format string
    Compile {
        /// Format string, e.g. "kill {user} (for {reason})"
        format: String,
        /// Print the reconstructed format string instead of the component tree
        #[arg(long)]
        canonical: bool,
    },

    /// Resolve call input against a command file
    Resolve {
        /// Path to a .toml or .json command file
        #[arg(long)]
        commands: PathBuf,
        /// Call input
        input: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// List every command that fully matches a single call
        #[arg(long)]
        all: bool,
    },

    /// Show version information
    Version,
}

/// Why a subcommand failed, mapped to the process exit code
enum Failure {
    /// Input, format or resolution problem (exit 1)
    Invalid(String),
    /// Unreadable or malformed command file (exit 2)
    Fatal(String),
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Failure::Invalid(_) => 1,
            Failure::Fatal(_) => 2,
        }
    }

    fn message(&self) -> &str {
        match self {
            Failure::Invalid(message) | Failure::Fatal(message) => message,
        }
    }
}

impl From<syscall_core::Error> for Failure {
    fn from(error: syscall_core::Error) -> Self {
        Failure::Invalid(error.to_string())
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Tokenize { input } => cmd_tokenize(&input),
        Commands::Compile { format, canonical } => cmd_compile(&format, canonical),
        Commands::Resolve {
            commands,
            input,
            json,
            all,
        } => cmd_resolve(&commands, &input, json, all),
        Commands::Version => {
            println!(
                "syscall {} (syscall-core {})",
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_VERSION")
            );
            Ok(())
        }
    };

    if let Err(failure) = result {
        eprintln!("{} {}", "error:".red().bold(), failure.message());
        process::exit(failure.exit_code());
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ── Subcommands ───────────────────────────────────────────

fn cmd_tokenize(input: &str) -> Result<(), Failure> {
    let calls = tokenizer::tokenize_all(input)?;
    print_json(&json!(calls))
}

fn cmd_compile(format: &str, canonical: bool) -> Result<(), Failure> {
    let components = syscall_core::compile(format)?;
    if canonical {
        println!("{}", syscall_core::parser::format_components(&components));
        Ok(())
    } else {
        print_json(&json!(components))
    }
}

fn cmd_resolve(path: &Path, input: &str, as_json: bool, all: bool) -> Result<(), Failure> {
    let commands = load_commands(path)?;
    tracing::debug!(commands = commands.len(), path = %path.display(), "loaded command file");

    let resolved = if all {
        syscall_core::find_matches(input, &commands)
    } else {
        syscall_core::parse_all(input, &commands)
    };

    let calls = match resolved {
        Ok(calls) if calls.is_empty() && all => {
            Err(Failure::Invalid(format!("No matching command: `{}`", input.trim())))
        }
        Ok(calls) => Ok(calls),
        Err(e) => Err(e.into()),
    };

    match (calls, as_json) {
        (Ok(calls), true) => print_json(&json!({
            "resolved": true,
            "calls": calls.iter().map(call_json).collect::<Vec<_>>(),
        })),
        (Ok(calls), false) => {
            for call in &calls {
                println!("{} {}", "✓".green(), call.name().bold());
                for (name, value) in decoded_arguments(call) {
                    println!("    {} = {}", name.cyan(), value);
                }
            }
            Ok(())
        }
        (Err(failure), true) => {
            print_json(&json!({
                "resolved": false,
                "error": failure.message(),
            }))?;
            Err(Failure::Invalid(failure.message().to_string()))
        }
        (Err(failure), false) => Err(failure),
    }
}

// ── Helpers ───────────────────────────────────────────────

fn print_json(value: &Value) -> Result<(), Failure> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| Failure::Fatal(format!("cannot serialize output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

fn call_json(call: &Call<'_>) -> Value {
    let arguments: serde_json::Map<String, Value> = decoded_arguments(call).into_iter().collect();
    json!({
        "command": call.name(),
        "arguments": arguments,
    })
}

/// Arguments decoded as values; undecodable ones fall back to their raw text
fn decoded_arguments(call: &Call<'_>) -> Vec<(String, Value)> {
    call.arguments
        .iter()
        .map(|(name, raw)| {
            let value = call
                .try_argument(name)
                .unwrap_or_else(|| Value::String(raw.clone()));
            (name.clone(), value)
        })
        .collect()
}

// ── Command files ─────────────────────────────────────────

#[derive(serde::Deserialize)]
struct TomlCommandFile {
    commands: toml::Table,
}

/// Load commands from a TOML `[commands]` table or a JSON object of
/// `name = format` pairs, keeping declaration order
fn load_commands(path: &Path) -> Result<Vec<Command>, Failure> {
    let text = fs::read_to_string(path)
        .map_err(|e| Failure::Fatal(format!("cannot read {}: {}", path.display(), e)))?;

    let formats = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml_formats(&text),
        Some("json") => json_formats(&text),
        _ => Err(format!(
            "unsupported command file {} (expected .toml or .json)",
            path.display()
        )),
    }
    .map_err(Failure::Fatal)?;

    formats
        .into_iter()
        .map(|(name, format)| {
            Command::parse(name.as_str(), &format)
                .map_err(|e| Failure::Fatal(format!("command '{}': {}", name, e)))
        })
        .collect()
}

fn toml_formats(text: &str) -> Result<Vec<(String, String)>, String> {
    let file: TomlCommandFile = toml::from_str(text).map_err(|e| e.to_string())?;
    file.commands
        .into_iter()
        .map(|(name, value)| match value {
            toml::Value::String(format) => Ok((name, format)),
            other => Err(format!(
                "command '{}' must be a format string, found {}",
                name,
                other.type_str()
            )),
        })
        .collect()
}

fn json_formats(text: &str) -> Result<Vec<(String, String)>, String> {
    let map: serde_json::Map<String, Value> =
        serde_json::from_str(text).map_err(|e| e.to_string())?;
    map.into_iter()
        .map(|(name, value)| match value {
            Value::String(format) => Ok((name, format)),
            _ => Err(format!("command '{}' must be a format string", name)),
        })
        .collect()
}
