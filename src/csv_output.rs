//! Append-only CSV files of benchmark rows
//!
//! One file per subject, `<root>/<subject>_benchmarks.csv`. The header is
//! written exactly when the file is empty, so a missing file and a file
//! truncated by [`CsvSink::reset`] both get a fresh header on the next row.

use crate::error::{HarnessError, Result};
use crate::schema::SubjectSchema;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Default directory for benchmark files
pub const DEFAULT_OUTPUT_DIR: &str = "benchmarks";

/// One measured outermost call
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRow {
    pub algorithm: String,
    /// Rendered values of the recorded parameters, in declaration order
    pub fields: Vec<String>,
    pub elapsed_ms: f64,
    pub peak_kib: f64,
}

impl BenchmarkRow {
    /// Render as a CSV line (no trailing newline)
    pub fn to_line(&self) -> String {
        let mut fields = Vec::with_capacity(self.fields.len() + 3);
        fields.push(escape_field(&self.algorithm));
        fields.extend(self.fields.iter().map(|field| escape_field(field)));
        fields.push(format!("{:.3}", self.elapsed_ms));
        fields.push(format!("{:.3}", self.peak_kib));
        fields.join(",")
    }
}

/// Escape CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Header line for a subject's file
pub fn header_line(schema: &SubjectSchema) -> String {
    schema
        .columns()
        .iter()
        .map(|column| escape_field(column))
        .collect::<Vec<_>>()
        .join(",")
}

/// Writes benchmark rows under a root directory
#[derive(Debug, Clone)]
pub struct CsvSink {
    root: PathBuf,
}

impl CsvSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination file for a subject
    pub fn path_for(&self, subject: &str) -> PathBuf {
        self.root.join(format!("{}_benchmarks.csv", subject))
    }

    fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| HarnessError::io(&self.root, e))
    }

    /// Truncate a subject's file to zero bytes, creating it if needed
    pub fn reset(&self, subject: &str) -> Result<PathBuf> {
        self.ensure_root()?;
        let path = self.path_for(subject);
        File::create(&path).map_err(|e| HarnessError::io(&path, e))?;
        tracing::debug!(path = %path.display(), "benchmark file reset");
        Ok(path)
    }

    /// Append one row, writing the header first if the file is empty
    ///
    /// Fails with [`HarnessError::SchemaMismatch`] if the file already starts
    /// with a different header.
    pub fn append(&self, schema: &SubjectSchema, row: &BenchmarkRow) -> Result<PathBuf> {
        self.ensure_root()?;
        let path = self.path_for(schema.name);
        let header = header_line(schema);

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|e| HarnessError::io(&path, e))?;
        let len = file
            .metadata()
            .map_err(|e| HarnessError::io(&path, e))?
            .len();

        let mut output = String::new();
        if len == 0 {
            output.push_str(&header);
            output.push('\n');
        } else {
            let mut first = String::new();
            BufReader::new(&file)
                .read_line(&mut first)
                .map_err(|e| HarnessError::io(&path, e))?;
            let found = first.trim_end_matches(['\r', '\n']);
            if found != header {
                return Err(HarnessError::SchemaMismatch {
                    path,
                    expected: header,
                    found: found.to_string(),
                });
            }
        }
        output.push_str(&row.to_line());
        output.push('\n');

        (&file)
            .write_all(output.as_bytes())
            .map_err(|e| HarnessError::io(&path, e))?;
        Ok(path)
    }
}

impl Default for CsvSink {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}
