//! ODM OpenAPI CLI
//!
//! Command-line interface for generating OpenAPI documents from model definitions.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use odm_openapi::{
    build_document, lint, load_json, load_models, validate, FileStatus, ModelDocument, Severity,
    ValidateError,
};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "odm-openapi")]
#[command(about = "Generate OpenAPI documents from document-mapper model definitions")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the OpenAPI document for every model
    Generate {
        /// Model definitions: file path or URL (http:// or https://)
        models: String,

        /// Base document the generated sections are merged into
        #[arg(long)]
        base: Option<PathBuf>,

        /// Set info.title
        #[arg(long)]
        title: Option<String>,

        /// Set info.version
        #[arg(long)]
        api_version: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the entity schema of one model
    Schema {
        /// Model definitions: file path or URL (http:// or https://)
        models: String,

        /// Model to translate
        #[arg(long, short)]
        model: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a payload against a model's entity schema
    Validate {
        /// Payload file to validate
        payload: PathBuf,

        /// Model definitions: file path or URL (http:// or https://)
        #[arg(long)]
        models: String,

        /// Model to validate against
        #[arg(long, short)]
        model: String,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Lint model-definition files
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            models,
            base,
            title,
            api_version,
            output,
            pretty,
        } => run_generate(GenerateArgs {
            models,
            base,
            title,
            api_version,
            output,
            pretty,
        }),
        Commands::Schema {
            models,
            model,
            pretty,
        } => run_schema(&models, &model, pretty),
        Commands::Validate {
            payload,
            models,
            model,
            json,
        } => run_validate(&payload, &models, &model, json),
        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "odm_openapi=debug",
        _ => "odm_openapi=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(source: &str) -> Result<ModelDocument, u8> {
    load_models(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn to_json(value: &Value, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

struct GenerateArgs {
    models: String,
    base: Option<PathBuf>,
    title: Option<String>,
    api_version: Option<String>,
    output: Option<PathBuf>,
    pretty: bool,
}

fn run_generate(args: GenerateArgs) -> Result<(), u8> {
    let models = load(&args.models)?;

    let mut base = match &args.base {
        Some(path) => load_json(path).map_err(|e| {
            eprintln!("Error loading base document: {}", e);
            e.exit_code() as u8
        })?,
        None => json!({}),
    };

    if let Some(base) = base.as_object_mut() {
        let info = base
            .entry("info")
            .or_insert_with(|| json!({ "title": "API", "version": "1.0.0" }));
        if let Some(info) = info.as_object_mut() {
            if let Some(title) = args.title {
                info.insert("title".into(), Value::String(title));
            }
            if let Some(version) = args.api_version {
                info.insert("version".into(), Value::String(version));
            }
        }
    }

    let document = build_document(&base, &models).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let json_output = to_json(&document, args.pretty)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_schema(source: &str, model: &str, pretty: bool) -> Result<(), u8> {
    let models = load(source)?;
    let schema = models.translate(model).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    println!("{}", to_json(&schema.to_value(), pretty)?);
    Ok(())
}

fn run_validate(payload_path: &Path, source: &str, model: &str, json_output: bool) -> Result<(), u8> {
    let payload = load_json(payload_path).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;

    let models = load_models(source).map_err(|e| {
        report_error(json_output, &format!("loading models: {}", e));
        e.exit_code() as u8
    })?;

    let result = build_document(&json!({}), &models)
        .map_err(ValidateError::from)
        .and_then(|document| validate(&document, model, &payload));

    match result {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(3);
    }

    let result = lint(path, strict);
    let passed = result.is_ok() && (!strict || result.warnings == 0);

    if format == "json" {
        let output = serde_json::to_string_pretty(&result).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", output);
    } else {
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            for diag in &file_result.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }
        }

        println!();
        if passed {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if passed {
        Ok(())
    } else {
        Err(1)
    }
}
