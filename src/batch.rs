use crate::parser::{locate_date, locate_value_with_fallback, normalize_date, normalize_value};
use crate::pdf::extract_pdf_text;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Value labels in priority order: the gross amount, then a plain total.
pub const DEFAULT_VALUE_LABELS: [&str; 2] = ["Gross Amount incl. VAT", "Total"];

/// One row of output: the extracted amount and date of a single invoice PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRecord {
    pub file_name: String,
    /// `DD-MM-YYYY` when recognized, the raw candidate otherwise, `None` if no date was found.
    pub date: Option<String>,
    pub value: String,
}

/// Builds a record from already extracted text.
///
/// Returns the label that produced the value along with the record, or `None`
/// if none of `labels` occurs in the text.
pub fn extract_record<'l, S: AsRef<str>>(
    file_name: &str,
    text: &str,
    labels: &'l [S],
) -> Option<(&'l str, InvoiceRecord)> {
    let (label, raw_value) = locate_value_with_fallback(text, labels)?;
    let candidate = locate_date(text);
    debug!("{file_name}: label {label:?} -> {raw_value:?}, date candidate {candidate:?}");
    Some((
        label,
        InvoiceRecord {
            file_name: file_name.to_string(),
            date: candidate.map(normalize_date),
            value: normalize_value(raw_value),
        },
    ))
}

/// Lists the `*.pdf` files directly inside `folder`, sorted by file name.
///
/// The suffix check is case-sensitive: `scan.PDF` is not picked up.
pub fn list_pdf_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry =
            entry.with_context(|| format!("failed to read directory {}", folder.display()))?;
        if entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(".pdf") {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn not_found_message(labels: &[impl AsRef<str>], file_name: &str) -> String {
    let tried: Vec<&str> = labels.iter().map(AsRef::as_ref).collect();
    format!("Neither {} found in {file_name}", tried.join(" nor "))
}

/// Processes every PDF in `folder` and collects one record per file that
/// yielded a value.
///
/// Files whose text can't be extracted, or that contain none of the labels,
/// are reported and skipped. Returns `None` when nothing was collected.
pub fn process_folder<S: AsRef<str>>(
    folder: &Path,
    labels: &[S],
) -> Result<Option<Vec<InvoiceRecord>>> {
    let files = list_pdf_files(folder)?;
    info!("found {} PDF file(s) in {}", files.len(), folder.display());

    let mut records = Vec::new();
    for path in &files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("Processing {file_name}...");

        match extract_pdf_text(path) {
            Ok(text) => match extract_record(&file_name, &text, labels) {
                Some((label, record)) => {
                    println!("{label} for {file_name}: {}", record.value);
                    records.push(record);
                }
                None => println!("{}", not_found_message(labels, &file_name)),
            },
            Err(err) => {
                warn!("skipping {}: {err:#}", path.display());
                println!("Warning: Could not read {file_name}: {err:#}");
            }
        }
        println!("{}", "-".repeat(40));
    }

    Ok((!records.is_empty()).then_some(records))
}
