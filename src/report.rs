use crate::batch::InvoiceRecord;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::Workbook;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const EXCEL_FILE_NAME: &str = "invoice_data.xlsx";
pub const CSV_FILE_NAME: &str = "invoice_data.csv";

pub const DATA_SHEET: &str = "Data";
pub const PIVOT_SHEET: &str = "Pivot Table";

pub const HEADERS: [&str; 3] = ["File Name", "Date", "Value"];
pub const PIVOT_HEADERS: [&str; 3] = ["Date", "File Name", "Value"];

/// Aggregated value of one (date, file name) group.
#[derive(Debug, Clone, PartialEq)]
pub enum PivotValue {
    Sum(Decimal),
    /// At least one member wasn't numeric; the raw strings are concatenated.
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub date: String,
    pub file_name: String,
    pub value: PivotValue,
}

// Only plain decimals count as numbers; "1,234.56" and "12,50" stay text.
fn parse_amount(value: &str) -> Option<Decimal> {
    Decimal::from_str(value).ok()
}

/// Sums the value column grouped by (date, file name), ordered by those keys.
///
/// Records without a date have no group key and are left out.
pub fn pivot(records: &[InvoiceRecord]) -> Vec<PivotRow> {
    let mut groups: BTreeMap<(&str, &str), Vec<&str>> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.date.as_deref() {
            groups
                .entry((date, record.file_name.as_str()))
                .or_default()
                .push(record.value.as_str());
        }
    }

    groups
        .into_iter()
        .map(|((date, file_name), values)| {
            let sum: Option<Decimal> = values.iter().map(|v| parse_amount(v)).sum();
            PivotRow {
                date: date.to_string(),
                file_name: file_name.to_string(),
                value: match sum {
                    Some(total) => PivotValue::Sum(total),
                    None => PivotValue::Text(values.concat()),
                },
            }
        })
        .collect()
}

/// Writes the workbook with a "Data" sheet listing every record and a
/// "Pivot Table" sheet holding the aggregated view.
pub fn write_excel(records: &[InvoiceRecord], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let data = workbook.add_worksheet();
    data.set_name(DATA_SHEET)?;
    for (col, header) in HEADERS.iter().enumerate() {
        data.write_string(0, col as u16, *header)?;
    }
    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        data.write_string(row, 0, &record.file_name)?;
        if let Some(date) = &record.date {
            data.write_string(row, 1, date)?;
        }
        data.write_string(row, 2, &record.value)?;
    }

    let pivot_sheet = workbook.add_worksheet();
    pivot_sheet.set_name(PIVOT_SHEET)?;
    for (col, header) in PIVOT_HEADERS.iter().enumerate() {
        pivot_sheet.write_string(0, col as u16, *header)?;
    }
    for (idx, entry) in pivot(records).iter().enumerate() {
        let row = (idx + 1) as u32;
        pivot_sheet.write_string(row, 0, &entry.date)?;
        pivot_sheet.write_string(row, 1, &entry.file_name)?;
        match &entry.value {
            PivotValue::Sum(total) => {
                pivot_sheet.write_number(row, 2, total.to_f64().unwrap_or_default())?;
            }
            PivotValue::Text(text) => {
                pivot_sheet.write_string(row, 2, text)?;
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Writes the records as semicolon separated text with a header line.
pub fn write_csv(records: &[InvoiceRecord], path: &Path) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    wtr.write_record(HEADERS)?;
    for record in records {
        wtr.write_record([
            record.file_name.as_str(),
            record.date.as_deref().unwrap_or(""),
            record.value.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes both output files into `folder` and returns their paths.
pub fn save_reports(records: &[InvoiceRecord], folder: &Path) -> Result<(PathBuf, PathBuf)> {
    let excel_path = folder.join(EXCEL_FILE_NAME);
    write_excel(records, &excel_path)?;
    let csv_path = folder.join(CSV_FILE_NAME);
    write_csv(records, &csv_path)?;
    Ok((excel_path, csv_path))
}
