// datacat CLI - catalog tabular files into a metadata and dictionary workbook

mod catalog;
mod exit_codes;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_AI_DISABLED, EXIT_AI_MISSING_KEY, EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "datacat")]
#[command(about = "Data-cataloging assistant: metadata, dictionary and completeness for tabular files")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Catalog CSV files and workbook sheets into a METADATOS/DICCIONARIO workbook
    #[command(after_help = "\
Examples:
  datacat catalog ventas.csv clientes.xlsx
  datacat catalog reporte.xlsx --sheet Ventas --sheet Clientes -o catalogo.xlsx
  datacat catalog ventas.csv --context 'Ventas mensuales del área comercial'
  datacat catalog ventas.csv --edits cambios.toml --json
  datacat catalog ventas.csv --offline

Edits file (TOML or JSON):
  [metadata.edited_rows.0]
  data_steward_operativo_contact = \"jperez\"
  periodicity = \"Mensual\"

  [dictionaries.T001]
  deleted_rows = [2]

Exit codes:
  0   Catalog written
  10  Classifier disabled (use --offline)
  11  Classifier API key missing
  20  Invalid steward contacts (export blocked)
  21  No readable tables")]
    Catalog {
        /// Input files (.csv, .tsv, .txt, .xlsx, .xlsm, .xls, .xlsb, .ods)
        files: Vec<PathBuf>,

        /// Workbook sheet to catalog (repeatable, processed in this order)
        #[arg(long = "sheet", value_name = "NAME")]
        sheets: Vec<String>,

        /// Free-text context passed to the classifier
        #[arg(long, conflicts_with = "context_file")]
        context: Option<String>,

        /// Read the classifier context from a file
        #[arg(long, value_name = "FILE")]
        context_file: Option<PathBuf>,

        /// Edits to apply before export (TOML or JSON)
        #[arg(long, value_name = "FILE")]
        edits: Option<PathBuf>,

        /// Output workbook (default: catalog.outputFile from settings)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Classify with local type heuristics instead of the configured provider
        #[arg(long)]
        offline: bool,

        /// Do not read or write the classification cache
        #[arg(long)]
        no_cache: bool,

        /// Output summary as JSON
        #[arg(long)]
        json: bool,

        /// Settings file (default: ~/.config/datacat/settings.json)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// List the sheets of a workbook that can be cataloged
    #[command(after_help = "\
Examples:
  datacat sheets reporte.xlsx
  datacat sheets reporte.xlsx --json

METADATOS and DICCIONARIO sheets are never listed.")]
    Sheets {
        /// Workbook or CSV file
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Completeness report of an exported catalog workbook
    #[command(after_help = "\
Examples:
  datacat score catalogo_metadatos_diccionario.xlsx
  datacat score catalogo.xlsx --json")]
    Score {
        /// Catalog workbook written by `datacat catalog`
        catalog: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply edits to an exported catalog workbook and export it again
    #[command(after_help = "\
Examples:
  datacat export catalogo.xlsx --edits cambios.toml -o catalogo_v2.xlsx")]
    Export {
        /// Catalog workbook written by `datacat catalog`
        catalog: PathBuf,

        /// Edits to apply (TOML or JSON)
        #[arg(long, value_name = "FILE")]
        edits: Option<PathBuf>,

        /// Output workbook
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Output summary as JSON
        #[arg(long)]
        json: bool,

        /// Settings file (default: ~/.config/datacat/settings.json)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Classifier configuration commands
    Ai {
        #[command(subcommand)]
        command: AiCommands,
    },
}

#[derive(Subcommand)]
enum AiCommands {
    /// Check classifier configuration and connectivity
    Doctor {
        /// Output as JSON for machine parsing
        #[arg(long)]
        json: bool,

        /// Send a one-row sample to the provider (requires network)
        #[arg(long)]
        test: bool,

        /// Settings file (default: ~/.config/datacat/settings.json)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  datacat-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  datacat-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

/// stderr logging, filtered by DATACAT_LOG (default: warn). Library crates
/// log through the `log` facade, which the subscriber also captures.
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("DATACAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: datacat <command> [options]");
            eprintln!("       datacat --help for more information");
            Ok(())
        }
        Some(Commands::Catalog {
            files,
            sheets,
            context,
            context_file,
            edits,
            output,
            offline,
            no_cache,
            json,
            config,
        }) => catalog::cmd_catalog(catalog::CatalogArgs {
            files,
            sheets,
            context,
            context_file,
            edits,
            output,
            offline,
            no_cache,
            json,
            config,
        }),
        Some(Commands::Sheets { file, json }) => catalog::cmd_sheets(file, json),
        Some(Commands::Score { catalog, json }) => catalog::cmd_score(catalog, json),
        Some(Commands::Export { catalog, edits, output, json, config }) => {
            catalog::cmd_export(catalog, edits, output, json, config)
        }
        Some(Commands::Ai { command }) => match command {
            AiCommands::Doctor { json, test, config } => cmd_ai_doctor(json, test, config),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(EXIT_PARSE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// ai doctor
// ============================================================================

fn cmd_ai_doctor(json: bool, test: bool, config: Option<PathBuf>) -> Result<(), CliError> {
    use datacat_classifier::HttpClassifier;
    use datacat_config::{AIConfigStatus, AIDiagnostics, ResolvedAIConfig};
    use datacat_engine::{ClassificationRequest, Classifier};

    let settings = catalog::load_settings(config.as_deref())?;
    let resolved = ResolvedAIConfig::from_settings(&settings.ai);
    let diag = AIDiagnostics::from_resolved(&resolved);

    let test_result = if test && resolved.status.is_ready() {
        let probe = ClassificationRequest {
            table_name: "prueba".to_string(),
            sample: serde_json::json!({ "id": [1], "nombre": ["Ana"] }),
            context: None,
        };
        Some(
            HttpClassifier::from_config(&resolved)
                .and_then(|client| client.classify(&probe))
                .map(|_| "ok".to_string())
                .unwrap_or_else(|e| format!("failed: {}", e)),
        )
    } else {
        None
    };

    if json {
        let mut out = serde_json::to_value(&diag).map_err(|e| CliError::general(e.to_string()))?;
        out["schema_version"] = serde_json::json!(1);
        out["test"] = serde_json::json!(test_result.as_deref().unwrap_or("skipped"));
        println!("{}", serde_json::to_string_pretty(&out).map_err(|e| CliError::general(e.to_string()))?);
    } else {
        print!("{}", diag);
        match &test_result {
            Some(result) => println!("Test:              {}", result),
            None => println!("Test:              skipped (use --test)"),
        }
        match resolved.status {
            AIConfigStatus::Disabled => {
                println!();
                println!("Classifier is disabled. To enable:");
                println!("  Set ai.provider in {}", datacat_config::Settings::config_path_display());
                println!("  or run `datacat catalog --offline` to use the built-in type heuristics");
            }
            AIConfigStatus::MissingKey => {
                println!();
                println!(
                    "Fix: set {} or store the key in the keychain",
                    datacat_config::ai::env_var_name(resolved.provider_name())
                );
            }
            AIConfigStatus::Ready => {}
        }
    }

    match resolved.status {
        AIConfigStatus::Disabled => Err(CliError::new(EXIT_AI_DISABLED, "classifier is disabled")),
        AIConfigStatus::MissingKey => {
            let reason = resolved.blocking_reason.unwrap_or_else(|| "unknown".to_string());
            Err(CliError::new(EXIT_AI_MISSING_KEY, format!("classifier misconfigured: {}", reason)))
        }
        AIConfigStatus::Ready => match test_result.as_deref() {
            Some(result) if result != "ok" => Err(CliError::general("provider test failed")),
            _ => Ok(()),
        },
    }
}
