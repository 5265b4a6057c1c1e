use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, XlsxError};
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

use pdp_core::{ResultRow, WorkItem};

pub const CSV_FILENAME: &str = "pdp_report.csv";
pub const XLSX_FILENAME: &str = "pdp_report.xlsx";
pub const PENDING_FILENAME: &str = "pdp_pending.txt";

const SHEET_NAME: &str = "Report";
const HEADER: [&str; 9] = [
    "TIMESTAMP",
    "ITEM",
    "URL",
    "PRODUCT_CODE",
    "TITLE",
    "REGULAR_PRICE",
    "DISCOUNT_PRICE",
    "SELLER",
    "STATUS",
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet build failed: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Durable sink for the accumulated row set. Called again after every pass
/// with the full set; each call overwrites the previous output.
pub trait ReportSink: Send + Sync {
    fn persist(&self, rows: &[ResultRow]) -> Result<(), ReportError>;
}

/// Writes the CSV/XLSX report pair into one output directory.
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn csv_path(&self) -> PathBuf {
        self.dir.join(CSV_FILENAME)
    }

    pub fn xlsx_path(&self) -> PathBuf {
        self.dir.join(XLSX_FILENAME)
    }
}

impl ReportSink for FileReportSink {
    fn persist(&self, rows: &[ResultRow]) -> Result<(), ReportError> {
        if rows.is_empty() {
            log::warn!("no rows to persist yet");
            return Ok(());
        }
        atomic_write(&self.dir, CSV_FILENAME, &render_csv(rows)?)?;
        atomic_write(&self.dir, XLSX_FILENAME, &render_xlsx(rows)?)?;
        log::info!("saved {CSV_FILENAME} and {XLSX_FILENAME} ({} rows)", rows.len());
        Ok(())
    }
}

// Column order is fixed; serde renames carry the header names.
#[derive(Serialize)]
struct CsvRecord<'a> {
    #[serde(rename = "TIMESTAMP")]
    timestamp: &'a str,
    #[serde(rename = "ITEM")]
    item: &'a str,
    #[serde(rename = "URL")]
    url: &'a str,
    #[serde(rename = "PRODUCT_CODE")]
    product_code: &'a str,
    #[serde(rename = "TITLE")]
    title: &'a str,
    #[serde(rename = "REGULAR_PRICE")]
    regular_price: Option<f64>,
    #[serde(rename = "DISCOUNT_PRICE")]
    discount_price: Option<f64>,
    #[serde(rename = "SELLER")]
    seller: &'a str,
    #[serde(rename = "STATUS")]
    status: String,
}

fn render_csv(rows: &[ResultRow]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        let fields = row.fields.as_ref();
        writer.serialize(CsvRecord {
            timestamp: &row.timestamp,
            item: &row.item_key,
            url: &row.url,
            product_code: fields.map(|f| f.code.as_str()).unwrap_or(""),
            title: fields.map(|f| f.title.as_str()).unwrap_or(""),
            regular_price: fields.and_then(|f| f.regular_price),
            discount_price: fields.and_then(|f| f.discount_price),
            seller: fields.map(|f| f.seller.as_str()).unwrap_or(""),
            status: row.status.to_string(),
        })?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|err| ReportError::Io(io::Error::other(err.to_string())))
}

fn render_xlsx(rows: &[ResultRow]) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (index, row) in rows.iter().enumerate() {
        let r = index as u32 + 1;
        sheet.write_string(r, 0, row.timestamp.as_str())?;
        sheet.write_string(r, 1, row.item_key.as_str())?;
        if row.url.starts_with("http") {
            sheet.write_url(r, 2, row.url.as_str())?;
        } else {
            sheet.write_string(r, 2, row.url.as_str())?;
        }
        if let Some(fields) = row.fields.as_ref() {
            sheet.write_string(r, 3, fields.code.as_str())?;
            sheet.write_string(r, 4, fields.title.as_str())?;
            if let Some(price) = fields.regular_price {
                sheet.write_number(r, 5, price)?;
            }
            if let Some(price) = fields.discount_price {
                sheet.write_number(r, 6, price)?;
            }
            sheet.write_string(r, 7, fields.seller.as_str())?;
        }
        sheet.write_string(r, 8, row.status.to_string().as_str())?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// One raw identifier per line, for a future run to pick up.
pub fn write_pending(dir: &Path, items: &[WorkItem]) -> Result<PathBuf, ReportError> {
    let mut content = String::new();
    for item in items {
        content.push_str(item.raw_id());
        content.push('\n');
    }
    atomic_write(dir, PENDING_FILENAME, content.as_bytes())
}

fn ensure_output_dir(dir: &Path) -> Result<(), ReportError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|err| ReportError::OutputDir(err.to_string()))?;
        if !meta.is_dir() {
            return Err(ReportError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|err| ReportError::OutputDir(err.to_string()))?;
    }
    Ok(())
}

/// Write a temp file in `dir` then rename over the target, so readers
/// never observe a half-written report.
fn atomic_write(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf, ReportError> {
    ensure_output_dir(dir)?;

    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    if target.exists() {
        fs::remove_file(&target)?;
    }
    tmp.persist(&target).map_err(|err| ReportError::Io(err.error))?;
    Ok(target)
}
