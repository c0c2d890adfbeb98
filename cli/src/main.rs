use std::path::{Path, PathBuf};

use argspec_core::{
    Halt, OnError, OnHelp, ParseOptions, ParsedArgs, Spec, SpecDocument, normalize, validate_spec,
};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Exit code for a parse that found problems in the tokens (not in the spec).
const PARSE_ERRORS_EXIT: i32 = 2;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argspec")]
#[command(about = "Validate option spec documents and resolve tokens against them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse tokens (given after `--`) against a spec document.
    Parse(ParseArgs),
    /// Validate a spec document.
    Validate(ValidateArgs),
    /// Print the normalized form of tokens (given after `--`) as JSON.
    Normalize(NormalizeArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Spec document (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    spec: PathBuf,
    /// Record every error instead of stopping at the first.
    #[arg(long)]
    collect: bool,
    /// Output format for the parsed values.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Tokens to parse.
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Spec document (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    spec: PathBuf,
}

#[derive(Debug, Args)]
struct NormalizeArgs {
    /// Tokens to normalize.
    #[arg(last = true)]
    tokens: Vec<String>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Validate(args) => run_validate(args).map(|()| 0),
        Command::Normalize(args) => run_normalize(args).map(|()| 0),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run_parse(args: ParseArgs) -> Result<i32, String> {
    let spec = load_spec(&args.spec)?;

    let on_error = if args.collect {
        OnError::Record
    } else {
        OnError::Return
    };
    let options = ParseOptions::new()
        .on_help(OnHelp::Call(Box::new(|| debug!("help name found"))))
        .on_error(on_error);

    match spec.parse_with(&args.tokens, options) {
        Ok(parsed) => {
            println!("{}", render(&parsed, args.format)?);
            if parsed.is_clean() {
                Ok(0)
            } else {
                for message in parsed.error_messages() {
                    eprintln!("error: {message}");
                }
                Ok(PARSE_ERRORS_EXIT)
            }
        }
        Err(Halt::Help { .. }) => {
            println!("help requested");
            Ok(0)
        }
        Err(halt) => {
            eprintln!("error: {halt}");
            Ok(PARSE_ERRORS_EXIT)
        }
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let document = load_document(&args.spec)?;
    let root = document.to_root().map_err(|e| e.to_string())?;

    let errors = validate_spec(&root);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("  {error}");
        }
        return Err(format!(
            "{} problem(s) found in '{}'",
            errors.len(),
            args.spec.display()
        ));
    }

    let spec = Spec::new(root).map_err(|e| e.to_string())?;
    println!(
        "Validated '{}': {} node(s).",
        args.spec.display(),
        spec.node_count()
    );
    Ok(())
}

fn run_normalize(args: NormalizeArgs) -> Result<(), String> {
    let tokens = normalize(&args.tokens).map_err(|e| e.to_string())?;
    let raw = serde_json::to_string(&tokens)
        .map_err(|err| format!("Failed to serialize tokens: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn load_document(path: &Path) -> Result<SpecDocument, String> {
    let document = SpecDocument::load(path)
        .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
    info!(path = %path.display(), nodes = document.options.len(), "spec document read");
    Ok(document)
}

fn load_spec(path: &Path) -> Result<Spec, String> {
    load_document(path)?
        .into_spec()
        .map_err(|e| e.to_string())
}

fn render(parsed: &ParsedArgs, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(parsed)
            .map_err(|err| format!("Failed to serialize result: {err}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(parsed)
            .map_err(|err| format!("Failed to serialize result: {err}")),
    }
}
