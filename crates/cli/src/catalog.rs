//! catalog / sheets / score / export commands.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::json;

use datacat_classifier::{CachedClassifier, HttpClassifier};
use datacat_config::{AIConfigStatus, ResolvedAIConfig, Settings};
use datacat_engine::{
    CatalogExport, CatalogOptions, CatalogSession, Classifier, EngineError, HeuristicClassifier, Notice,
    SessionEdits,
};
use datacat_io::source::{format_of, TEXT_FORMATS, WORKBOOK_FORMATS};
use datacat_io::{load_sources, read_catalog, write_catalog, xlsx};

use crate::exit_codes::{
    engine_exit_code, EXIT_AI_DISABLED, EXIT_AI_MISSING_KEY, EXIT_CATALOG_EMPTY, EXIT_CATALOG_STEWARDS,
};
use crate::report;
use crate::CliError;

pub struct CatalogArgs {
    pub files: Vec<PathBuf>,
    pub sheets: Vec<String>,
    pub context: Option<String>,
    pub context_file: Option<PathBuf>,
    pub edits: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub offline: bool,
    pub no_cache: bool,
    pub json: bool,
    pub config: Option<PathBuf>,
}

// ============================================================================
// Shared helpers
// ============================================================================

pub fn load_settings(config: Option<&Path>) -> Result<Settings, CliError> {
    match config {
        Some(path) => Settings::load_from(path).map_err(CliError::parse),
        None => Ok(Settings::load()),
    }
}

fn options(settings: &Settings) -> CatalogOptions {
    let mut options = CatalogOptions::today();
    options.sample_rows = settings.sample_rows;
    options.sample_seed = settings.sample_seed;
    options
}

/// The classifier for this run: the built-in heuristics when offline,
/// otherwise the configured provider behind the on-disk cache.
fn classifier(settings: &Settings, offline: bool, no_cache: bool) -> Result<Box<dyn Classifier>, CliError> {
    if offline {
        log::debug!("offline: classifying with type heuristics");
        return Ok(Box::new(HeuristicClassifier));
    }

    let config = ResolvedAIConfig::from_settings(&settings.ai);
    match config.status {
        AIConfigStatus::Ready => {}
        AIConfigStatus::Disabled => {
            return Err(CliError::new(EXIT_AI_DISABLED, "classifier disabled (ai.provider = \"none\")")
                .with_hint("pass --offline to catalog with the built-in type heuristics"));
        }
        AIConfigStatus::MissingKey => {
            let reason = config.blocking_reason.clone().unwrap_or_else(|| "missing API key".into());
            return Err(CliError::new(EXIT_AI_MISSING_KEY, reason)
                .with_hint("run `datacat ai doctor` to inspect the configuration"));
        }
    }

    let http = HttpClassifier::from_config(&config).map_err(|e| CliError::general(e.to_string()))?;
    if no_cache {
        return Ok(Box::new(http));
    }
    let namespace = format!("{}:{}", config.provider_name(), config.model);
    log::debug!("classifier {} with cache at {}", namespace, Settings::cache_dir().display());
    Ok(Box::new(CachedClassifier::new(http, Settings::cache_dir(), namespace)))
}

fn read_context(context: Option<String>, context_file: Option<&Path>) -> Result<Option<String>, CliError> {
    if let Some(path) = context_file {
        let text = fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
        return Ok(Some(text));
    }
    Ok(context)
}

fn read_edits(path: &Path) -> Result<SessionEdits, CliError> {
    let text = fs::read_to_string(path).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
    SessionEdits::parse(&text, &format_of(path)).map_err(CliError::engine)
}

fn print_notes<T: std::fmt::Display>(notes: &[T]) {
    for note in notes {
        eprintln!("note: {}", note);
    }
}

/// Export the session, or report the steward issues that block it.
fn export_session(session: &CatalogSession, json: bool) -> Result<CatalogExport, CliError> {
    match session.export() {
        Ok(export) => Ok(export),
        Err(EngineError::InvalidStewards(issues)) => {
            if json {
                let out = json!({ "error": "invalid_stewards", "issues": issues });
                println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
            } else {
                let _ = report::write_steward_issues(&mut io::stderr(), &issues, session.domain());
            }
            Err(CliError::new(EXIT_CATALOG_STEWARDS, "export blocked by invalid steward contacts")
                .with_hint("fix the contacts in an edits file and pass it with --edits"))
        }
        Err(e) => Err(CliError::engine(e)),
    }
}

fn write_and_summarize(
    session: &CatalogSession,
    export: &CatalogExport,
    output: &Path,
    notices: &[Notice],
    json: bool,
) -> Result<(), CliError> {
    let written = write_catalog(export, output).map_err(CliError::io)?;
    let scores = session.completeness();

    if json {
        let out = json!({
            "output": output.display().to_string(),
            "fingerprint": export.fingerprint(),
            "tables": export.metadata().rows.len(),
            "dictionary_rows": export.dictionary().rows.len(),
            "validations": written.validations_exported,
            "completeness": scores,
            "notices": notices,
        });
        println!("{}", serde_json::to_string_pretty(&out).map_err(|e| CliError::general(e.to_string()))?);
        return Ok(());
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    report::write_completeness(&mut handle, &scores).map_err(|e| CliError::io(e.to_string()))?;
    writeln!(
        handle,
        "\nWrote {} ({} table(s), {} dictionary row(s))",
        output.display(),
        export.metadata().rows.len(),
        export.dictionary().rows.len(),
    )
    .map_err(|e| CliError::io(e.to_string()))?;
    Ok(())
}

// ============================================================================
// catalog
// ============================================================================

pub fn cmd_catalog(args: CatalogArgs) -> Result<(), CliError> {
    if args.files.is_empty() {
        return Err(CliError::args("no input files").with_hint("datacat catalog ventas.csv clientes.xlsx"));
    }

    let settings = load_settings(args.config.as_deref())?;
    let context = read_context(args.context, args.context_file.as_deref())?;
    let classifier = classifier(&settings, args.offline, args.no_cache)?;

    let loaded = load_sources(&args.files, &args.sheets);
    print_notes(&loaded.warnings);
    if loaded.tables.is_empty() {
        return Err(CliError::new(EXIT_CATALOG_EMPTY, "no readable tables in the given files")
            .with_hint(format!(
                "supported formats: {}, {}",
                TEXT_FORMATS.join(", "),
                WORKBOOK_FORMATS.join(", ")
            )));
    }

    let mut session = CatalogSession::new(settings.email_domain.clone(), options(&settings));
    let mut notices = session.process(&loaded.tables, context.as_deref(), classifier.as_ref()).to_vec();

    if let Some(path) = &args.edits {
        let edits = read_edits(path)?;
        notices.extend(session.apply_edits(&edits));
    }
    print_notes(&notices);

    let export = export_session(&session, args.json)?;
    let output = args.output.unwrap_or_else(|| PathBuf::from(&settings.output_file));
    write_and_summarize(&session, &export, &output, &notices, args.json)
}

// ============================================================================
// sheets
// ============================================================================

pub fn cmd_sheets(file: PathBuf, json: bool) -> Result<(), CliError> {
    let format = format_of(&file);
    let names = if WORKBOOK_FORMATS.contains(&format.as_str()) {
        let all = xlsx::list_sheets(&file).map_err(CliError::io)?;
        xlsx::selectable_sheets(&all)
    } else if TEXT_FORMATS.contains(&format.as_str()) {
        if !file.exists() {
            return Err(CliError::io(format!("{}: file not found", file.display())));
        }
        file.file_stem().map(|s| vec![s.to_string_lossy().into_owned()]).unwrap_or_default()
    } else {
        return Err(CliError::args(format!("unsupported format '{}'", format)));
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&names).map_err(|e| CliError::general(e.to_string()))?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

// ============================================================================
// score
// ============================================================================

pub fn cmd_score(catalog: PathBuf, json: bool) -> Result<(), CliError> {
    let import = read_catalog(&catalog).map_err(CliError::parse)?;
    print_notes(&import.warnings);

    let scores = datacat_engine::report(&import.tables);
    if json {
        println!("{}", serde_json::to_string_pretty(&scores).map_err(|e| CliError::general(e.to_string()))?);
        return Ok(());
    }
    report::write_completeness(&mut io::stdout().lock(), &scores).map_err(|e| CliError::io(e.to_string()))
}

// ============================================================================
// export
// ============================================================================

pub fn cmd_export(
    catalog: PathBuf,
    edits: Option<PathBuf>,
    output: PathBuf,
    json: bool,
    config: Option<PathBuf>,
) -> Result<(), CliError> {
    let settings = load_settings(config.as_deref())?;
    let import = read_catalog(&catalog).map_err(CliError::parse)?;
    print_notes(&import.warnings);

    let mut session =
        CatalogSession::from_records(settings.email_domain.clone(), options(&settings), import.tables, import.columns);

    let mut notices = Vec::new();
    if let Some(path) = &edits {
        let edits = read_edits(path)?;
        notices = session.apply_edits(&edits);
    }
    print_notes(&notices);

    let export = export_session(&session, json)?;
    write_and_summarize(&session, &export, &output, &notices, json)
}

impl CliError {
    pub fn engine(err: EngineError) -> Self {
        Self::new(engine_exit_code(&err), err.to_string())
    }
}
