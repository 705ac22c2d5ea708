// Integration tests for the datacat binary.
//
// Every test runs against its own temp dir and an explicit --config file, so
// no real settings, keychain or network are involved (catalog runs use
// --offline).
//
// Run with: cargo test -p datacat-cli --test cli_tests -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use calamine::{open_workbook_auto, Reader};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(provider: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let settings = format!(
            r#"{{
    // test settings
    "catalog.emailDomain": "asbanc.com.pe",
    "ai": {{ "provider": "{}" }}
}}"#,
            provider
        );
        fs::write(dir.path().join("settings.json"), settings).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }

    /// Run datacat; commands that read settings get the fixture's file.
    fn run(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_datacat"));
        cmd.current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path())
            .env("XDG_CACHE_HOME", self.dir.path())
            .env("HOME", self.dir.path())
            .env_remove("DATACAT_OPENAI_KEY")
            .env_remove("DATACAT_LOG")
            .args(args);
        if matches!(args.first(), Some(&"catalog") | Some(&"export") | Some(&"ai")) {
            cmd.arg("--config").arg(self.path("settings.json"));
        }
        cmd.output().expect("run datacat")
    }

    fn ventas(&self) -> PathBuf {
        self.write(
            "ventas.csv",
            "codigo;fecha;monto\nA1;2024-01-05;10.5\nA2;2024-01-06;20\nA3;2024-02-01;7\n",
        )
    }
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be JSON: {}\n{}", e, stdout))
}

/// All rows of a sheet as strings, header first.
fn sheet_rows(path: &Path, sheet: &str) -> Vec<Vec<String>> {
    let mut workbook = open_workbook_auto(path).unwrap();
    let range = workbook.worksheet_range(sheet).unwrap();
    range.rows().map(|row| row.iter().map(|c| c.to_string()).collect()).collect()
}

fn column<'a>(rows: &'a [Vec<String>], header: &str) -> Vec<&'a str> {
    let idx = rows[0].iter().position(|h| h == header).unwrap_or_else(|| panic!("no column {}", header));
    rows[1..].iter().map(|r| r.get(idx).map(String::as_str).unwrap_or("")).collect()
}

// ===========================================================================
// catalog
// ===========================================================================

#[test]
fn catalog_offline_writes_two_sheet_workbook() {
    let fx = Fixture::new("none");
    let input = fx.ventas();
    let out = fx.path("catalogo.xlsx");

    let output = fx.run(&["catalog", input.to_str().unwrap(), "--offline", "-o", out.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let workbook = open_workbook_auto(&out).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["METADATOS".to_string(), "DICCIONARIO".to_string()]);

    let meta = sheet_rows(&out, "METADATOS");
    assert_eq!(meta.len(), 2);
    assert_eq!(column(&meta, "table_id"), vec!["T001"]);
    assert_eq!(column(&meta, "table_name"), vec!["ventas"]);
    assert_eq!(column(&meta, "unique_identifier"), vec!["codigo"]);
    assert_eq!(meta[0].last().unwrap(), "% Completitud");

    let dict = sheet_rows(&out, "DICCIONARIO");
    assert_eq!(column(&dict, "Atributo"), vec!["codigo", "fecha", "monto"]);
    assert_eq!(column(&dict, "Tipo de dato"), vec!["texto", "fecha", "numero"]);
    assert_eq!(column(&dict, "id_atributo"), vec!["a001", "a002", "a003"]);
}

#[test]
fn catalog_json_summary_and_edits() {
    let fx = Fixture::new("none");
    let input = fx.ventas();
    let edits = fx.write(
        "cambios.toml",
        r#"
[metadata.edited_rows.0]
data_steward_operativo_contact = "jperez"
periodicity = "Mensual"

[dictionaries.T001]
deleted_rows = [1]
"#,
    );
    let out = fx.path("out.xlsx");

    let output = fx.run(&[
        "catalog",
        input.to_str().unwrap(),
        "--offline",
        "--edits",
        edits.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let summary = json_stdout(&output);
    assert_eq!(summary["tables"], 1);
    assert_eq!(summary["dictionary_rows"], 2);
    assert!(summary["fingerprint"].as_str().unwrap().starts_with("blake3:"));
    assert_eq!(summary["completeness"][0]["table_id"], "T001");

    let meta = sheet_rows(&out, "METADATOS");
    assert_eq!(column(&meta, "data_steward_operativo_contact"), vec!["jperez@asbanc.com.pe"]);
    assert_eq!(column(&meta, "periodicity"), vec!["Mensual"]);

    let dict = sheet_rows(&out, "DICCIONARIO");
    assert_eq!(column(&dict, "Atributo"), vec!["codigo", "monto"]);
}

#[test]
fn catalog_help_edits_example_applies() {
    let fx = Fixture::new("none");
    let help = fx.run(&["catalog", "--help"]);
    assert!(help.status.success());
    let text = String::from_utf8_lossy(&help.stdout).into_owned();

    let example: String = text
        .lines()
        .skip_while(|line| !line.starts_with("Edits file"))
        .skip(1)
        .take_while(|line| !line.starts_with("Exit codes"))
        .map(|line| format!("{}\n", line.trim_start()))
        .collect();
    assert!(example.contains("[metadata.edited_rows.0]"), "{}", text);
    let edits = fx.write("ejemplo.toml", &example);
    let out = fx.path("out.xlsx");

    let output = fx.run(&[
        "catalog",
        fx.ventas().to_str().unwrap(),
        "--offline",
        "--edits",
        edits.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!stderr(&output).contains("note:"), "stderr: {}", stderr(&output));

    let meta = sheet_rows(&out, "METADATOS");
    assert_eq!(column(&meta, "data_steward_operativo_contact"), vec!["jperez@asbanc.com.pe"]);
    assert_eq!(column(&meta, "periodicity"), vec!["Mensual"]);
}

#[test]
fn catalog_blocks_invalid_steward() {
    let fx = Fixture::new("none");
    let input = fx.ventas();
    let edits = fx.write(
        "cambios.json",
        r#"{"metadata": {"edited_rows": {"0": {"data_steward_ejecutivo_contact": "juan perez"}}}}"#,
    );
    let out = fx.path("out.xlsx");

    let output = fx.run(&[
        "catalog",
        input.to_str().unwrap(),
        "--offline",
        "--edits",
        edits.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(20), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("juan perez@asbanc.com.pe"));
    assert!(!out.exists());
}

#[test]
fn catalog_without_classifier_needs_offline() {
    let fx = Fixture::new("none");
    let input = fx.ventas();

    let output = fx.run(&["catalog", input.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(10));
    assert!(stderr(&output).contains("--offline"));
}

#[test]
fn catalog_missing_key_exits_11() {
    let fx = Fixture::new("openai");
    let input = fx.ventas();

    let output = fx.run(&["catalog", input.to_str().unwrap()]);
    // A key in the system keychain would make the provider ready
    if output.status.code() != Some(11) {
        return;
    }
    assert!(stderr(&output).contains("DATACAT_OPENAI_KEY"));
}

#[test]
fn catalog_skips_unsupported_and_fails_when_nothing_left() {
    let fx = Fixture::new("none");
    let notes = fx.write("notas.pdf", "%PDF-1.4");

    let output = fx.run(&["catalog", notes.to_str().unwrap(), "--offline"]);
    assert_eq!(output.status.code(), Some(21));
    assert!(stderr(&output).contains("note: notas.pdf: unsupported format 'pdf'"));
}

#[test]
fn catalog_workbook_sheets_in_selection_order() {
    let fx = Fixture::new("none");
    let book = fx.path("reporte.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    for name in ["Ventas", "Clientes", "METADATOS"] {
        let sheet = workbook.add_worksheet().set_name(name).unwrap();
        sheet.write_string(0, 0, "id").unwrap();
        sheet.write_number(1, 0, 1.0).unwrap();
        sheet.write_number(2, 0, 2.0).unwrap();
    }
    workbook.save(&book).unwrap();
    let out = fx.path("out.xlsx");

    let output = fx.run(&[
        "catalog",
        book.to_str().unwrap(),
        "--sheet",
        "Clientes",
        "--sheet",
        "Ventas",
        "--sheet",
        "Proveedores",
        "--offline",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("sheet 'Proveedores' was not found"));

    let meta = sheet_rows(&out, "METADATOS");
    assert_eq!(column(&meta, "table_id"), vec!["T001", "T002"]);
    assert_eq!(column(&meta, "table_name"), vec!["Clientes", "Ventas"]);
}

// ===========================================================================
// sheets
// ===========================================================================

#[test]
fn sheets_hides_reserved_names() {
    let fx = Fixture::new("none");
    let book = fx.path("reporte.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    for name in ["Ventas", "diccionario", "Clientes"] {
        workbook.add_worksheet().set_name(name).unwrap();
    }
    workbook.save(&book).unwrap();

    let output = fx.run(&["sheets", book.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(json_stdout(&output), serde_json::json!(["Ventas", "Clientes"]));
}

// ===========================================================================
// score / export
// ===========================================================================

#[test]
fn score_and_reexport_catalog() {
    let fx = Fixture::new("none");
    let input = fx.ventas();
    let first = fx.path("catalogo.xlsx");
    let output = fx.run(&["catalog", input.to_str().unwrap(), "--offline", "-o", first.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = fx.run(&["score", first.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let scores = json_stdout(&output);
    let before = scores[0]["percent"].as_f64().unwrap();
    assert!(scores[0]["missing"].as_array().unwrap().iter().any(|m| m == "periodicity"));

    let edits = fx.write(
        "cambios.toml",
        r#"
[metadata.edited_rows.0]
periodicity = "Diaria"
data_steward_operativo_contact = "ana.rios"
"#,
    );
    let second = fx.path("catalogo_v2.xlsx");
    let output = fx.run(&[
        "export",
        first.to_str().unwrap(),
        "--edits",
        edits.to_str().unwrap(),
        "-o",
        second.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = fx.run(&["score", second.to_str().unwrap(), "--json"]);
    let after = json_stdout(&output)[0]["percent"].as_f64().unwrap();
    assert!(after > before, "{} -> {}", before, after);

    let meta = sheet_rows(&second, "METADATOS");
    assert_eq!(column(&meta, "data_steward_operativo_contact"), vec!["ana.rios@asbanc.com.pe"]);
    let dict = sheet_rows(&second, "DICCIONARIO");
    assert_eq!(dict.len(), 4);
}

#[test]
fn score_text_report() {
    let fx = Fixture::new("none");
    let input = fx.ventas();
    let out = fx.path("catalogo.xlsx");
    fx.run(&["catalog", input.to_str().unwrap(), "--offline", "-o", out.to_str().unwrap()]);

    let output = fx.run(&["score", out.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.lines().nth(1).unwrap().starts_with("T001"));
    assert!(text.contains("periodicity"));
}

#[test]
fn score_rejects_non_catalog_workbook() {
    let fx = Fixture::new("none");
    let book = fx.path("otro.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    workbook.add_worksheet().set_name("Hoja1").unwrap();
    workbook.save(&book).unwrap();

    let output = fx.run(&["score", book.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("METADATOS"));
}

// ===========================================================================
// ai doctor
// ===========================================================================

#[test]
fn ai_doctor_reports_disabled() {
    let fx = Fixture::new("none");
    let output = fx.run(&["ai", "doctor", "--json"]);
    assert_eq!(output.status.code(), Some(10));

    let report = json_stdout(&output);
    assert_eq!(report["provider"], "none");
    assert_eq!(report["status"], "disabled");
    assert_eq!(report["test"], "skipped");
}

#[test]
fn ai_doctor_local_is_ready() {
    let fx = Fixture::new("local");
    let output = fx.run(&["ai", "doctor"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("http://localhost:11434/v1"));
    assert!(text.contains("llama3:8b"));
}
