//! Model linting - static analysis of model-definition files.
//!
//! | Code | Severity | Meaning |
//! |------|----------|---------|
//! | `E001` | error | file unreadable or not valid JSON |
//! | `E002` | error | malformed declaration or unknown embedded sub-schema |
//! | `E003` | error | embedded sub-schema that embeds itself |
//! | `W001` | warning | `ref` to an entity the file doesn't define |
//! | `W002` | warning | unrecognized type name, translated as a plain object |

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::assembler::assemble;
use crate::error::{LoadError, TranslateError};
use crate::loader::load_json;
use crate::model::{parse_models, ModelDocument};
use crate::types::{DeclaredType, FieldDescriptor, SchemaTree, TranslateOptions};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// JSON path to the issue (e.g., "/models/story/schema/author")
    pub path: String,
    pub message: String,
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a file or directory.
///
/// If path is a directory, recursively finds all .json files.
/// If `strict` is true, warnings are treated as errors.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_json_files(path);
    let results: Vec<FileResult> = files.iter().map(|file| lint_file(file, path)).collect();

    let count = |severity: Severity| {
        results
            .iter()
            .flat_map(|r| &r.diagnostics)
            .filter(|d| d.severity == severity)
            .count()
    };
    let errors = count(Severity::Error);
    let warnings = count(Severity::Warning);

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors,
        warnings,
        results,
    }
}

/// Lint a single model-definition file.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let mut sink = Sink {
        file,
        diagnostics: Vec::new(),
    };

    match load_json(file) {
        Err(e) => sink.error("E001", "/", format!("syntax error: {}", e)),
        Ok(raw) => match parse_models(&raw) {
            Err(e) => sink.error("E002", declaration_path(&e), e.to_string()),
            Ok(document) => check_document(&document, &mut sink),
        },
    }

    let diagnostics = sink.diagnostics;
    let status = if diagnostics.iter().any(|d| d.severity == Severity::Error) {
        FileStatus::Error
    } else if diagnostics.is_empty() {
        FileStatus::Ok
    } else {
        FileStatus::Warning
    };

    FileResult {
        file: file.strip_prefix(base_path).unwrap_or(file).to_path_buf(),
        status,
        diagnostics,
    }
}

struct Sink<'a> {
    file: &'a Path,
    diagnostics: Vec<Diagnostic>,
}

impl Sink<'_> {
    fn push(&mut self, severity: Severity, code: &str, path: &str, message: String) {
        self.diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            file: self.file.to_path_buf(),
            path: path.to_string(),
            message,
        });
    }

    fn error(&mut self, code: &str, path: &str, message: String) {
        self.push(Severity::Error, code, path, message);
    }

    fn warning(&mut self, code: &str, path: &str, message: String) {
        self.push(Severity::Warning, code, path, message);
    }
}

fn declaration_path(error: &LoadError) -> &str {
    match error {
        LoadError::InvalidDeclaration { path, .. } | LoadError::UnknownSubschema { path, .. } => {
            path
        }
        _ => "/",
    }
}

fn check_document(document: &ModelDocument, sink: &mut Sink<'_>) {
    // Every cycle passes through a sub-schema, so translating those finds them all.
    for name in document.schemas.names() {
        let Some(tree) = document.schemas.get(name) else {
            continue;
        };
        let path = format!("/schemas/{}", name);
        if let Err(e @ TranslateError::CyclicSchema { .. }) =
            assemble(name, tree, &TranslateOptions::default(), &document.schemas)
        {
            sink.error("E003", &path, e.to_string());
        }
        check_fields(tree, &path, document, sink);
    }

    for model in &document.models {
        let path = format!("/models/{}/schema", model.name);
        check_fields(&model.tree, &path, document, sink);
    }
}

fn check_fields(tree: &SchemaTree, path: &str, document: &ModelDocument, sink: &mut Sink<'_>) {
    for (name, field) in tree.iter() {
        check_field(field, &format!("{}/{}", path, name), document, sink);
    }
}

fn check_field(field: &FieldDescriptor, path: &str, document: &ModelDocument, sink: &mut Sink<'_>) {
    if let Some(target) = &field.reference {
        if document.model(target).is_none() {
            sink.warning(
                "W001",
                path,
                format!("reference to undefined model \"{}\"", target),
            );
        }
    }

    match &field.declared {
        DeclaredType::Unknown(name) => sink.warning(
            "W002",
            path,
            format!("unknown type \"{}\", translated as object", name),
        ),
        DeclaredType::Nested(tree) => check_fields(tree, path, document, sink),
        DeclaredType::Array(Some(inner)) => {
            check_field(inner, &format!("{}/0", path), document, sink)
        }
        DeclaredType::Map(Some(inner)) => {
            check_field(inner, &format!("{}/of", path), document, sink)
        }
        _ => {}
    }
}

/// Collect all .json files in a path (file or directory).
fn collect_json_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if is_json(path) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if is_json(&path) {
            files.push(path);
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().map(|e| e == "json").unwrap_or(false)
}
