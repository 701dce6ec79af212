use crate::adapters::{CsvIngestion, ExcelIngestion};
use crate::domain::model::{Column, ColumnSet, LoadReport, RawTable, SalesDataset, Transaction};
use crate::domain::ports::{IngestionStrategy, Storage};
use crate::utils::error::{DashboardError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::path::Path;

const EXCEL_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];
const CSV_EXTENSIONS: [&str; 2] = ["csv", "tsv"];

/// Number of rejected rows reported individually before going quiet.
const MAX_REJECTION_WARNINGS: usize = 5;

pub fn supported_extensions() -> Vec<&'static str> {
    EXCEL_EXTENSIONS.iter().chain(CSV_EXTENSIONS.iter()).copied().collect()
}

/// Holds the ingestion strategy in use; the strategy can be swapped at runtime.
pub struct IngestionContext {
    strategy: Box<dyn IngestionStrategy>,
}

impl IngestionContext {
    pub fn new(strategy: Box<dyn IngestionStrategy>) -> Self {
        Self { strategy }
    }

    /// Picks a strategy from the file extension.
    pub fn for_path(path: &str, sheet: Option<&str>) -> Result<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let strategy: Box<dyn IngestionStrategy> = match extension.as_str() {
            ext if EXCEL_EXTENSIONS.contains(&ext) => match sheet {
                Some(name) => Box::new(ExcelIngestion::with_sheet(name)),
                None => Box::new(ExcelIngestion::new()),
            },
            "tsv" => Box::new(CsvIngestion::tsv()),
            "csv" => Box::new(CsvIngestion::new()),
            _ => {
                return Err(DashboardError::UnsupportedFormatError {
                    path: path.to_string(),
                })
            }
        };

        Ok(Self::new(strategy))
    }

    pub fn set_strategy(&mut self, strategy: Box<dyn IngestionStrategy>) {
        self.strategy = strategy;
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn ingest(&self, data: &[u8]) -> Result<RawTable> {
        self.strategy.ingest(data)
    }
}

/// Reads a data file through `Storage` and builds the in-memory dataset.
pub struct DataLoader<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> DataLoader<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    pub async fn load(&self, path: &str, sheet: Option<&str>) -> Result<SalesDataset> {
        let context = IngestionContext::for_path(path, sheet)?;
        tracing::info!("Loading {} with {} ingestion", path, context.strategy_name());

        let bytes = self.storage.read_file(path).await?;
        let raw = context.ingest(&bytes)?;
        let dataset = build_dataset(&raw, path)?;

        let report = dataset.load_report();
        tracing::info!(
            "Loaded {} of {} rows ({} rejected, {} without a valid date)",
            report.loaded_rows,
            report.total_rows,
            report.rejected_rows,
            report.undated_rows
        );
        Ok(dataset)
    }
}

/// Maps recognised headers to columns and parses every row.
pub fn build_dataset(raw: &RawTable, source: &str) -> Result<SalesDataset> {
    if raw.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(DashboardError::EmptyDatasetError {
            message: "no header row found".to_string(),
        });
    }

    let mut positions: HashMap<Column, usize> = HashMap::new();
    for (index, header) in raw.headers.iter().enumerate() {
        match Column::from_header(header) {
            Some(column) => {
                positions.entry(column).or_insert(index);
            }
            None if !header.trim().is_empty() => {
                tracing::debug!("Ignoring unrecognised column '{}'", header.trim());
            }
            None => {}
        }
    }

    let columns: ColumnSet = positions.keys().copied().collect();
    let mut report = LoadReport {
        source: source.to_string(),
        columns: columns.iter().copied().collect(),
        ..Default::default()
    };

    let mut transactions = Vec::with_capacity(raw.rows.len());
    for (index, row) in raw.rows.iter().enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        report.total_rows += 1;

        match parse_row(row, &positions) {
            Ok(transaction) => {
                if positions.contains_key(&Column::Date) && transaction.date.is_none() {
                    report.undated_rows += 1;
                }
                transactions.push(transaction);
            }
            Err(reason) => {
                report.rejected_rows += 1;
                if report.rejected_rows <= MAX_REJECTION_WARNINGS {
                    // +2: one for the header, one for 1-based numbering
                    tracing::warn!("Skipping row {}: {}", index + 2, reason);
                }
            }
        }
    }

    report.loaded_rows = transactions.len();
    Ok(SalesDataset::new(columns, transactions).with_report(report))
}

fn parse_row(
    row: &[String],
    positions: &HashMap<Column, usize>,
) -> std::result::Result<Transaction, String> {
    let cell = |column: Column| {
        positions
            .get(&column)
            .and_then(|&i| row.get(i))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    };

    let text = |column: Column| cell(column).map(str::to_string);

    let number = |column: Column| -> std::result::Result<Option<f64>, String> {
        match cell(column) {
            None => Ok(None),
            Some(raw) => parse_number(raw)
                .map(Some)
                .ok_or_else(|| format!("{} '{}' is not numeric", column.display_name(), raw)),
        }
    };

    Ok(Transaction {
        date: cell(Column::Date).and_then(parse_date),
        customer_id: text(Column::CustomerId),
        region: text(Column::Region),
        product: text(Column::Product),
        quantity: number(Column::Quantity)?,
        revenue: number(Column::Revenue)?,
    })
}

/// Accepts plain numbers plus thousands separators and a currency sign,
/// before or after a leading minus (`-$5` and `$-5` both parse).
pub fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let mut cleaned = String::with_capacity(raw.len());
    if negative {
        cleaned.push('-');
    }
    cleaned.extend(
        unsigned
            .trim_start_matches(['$', '€', '£'])
            .chars()
            .filter(|c| *c != ','),
    );
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coercing date parser: anything unrecognised yields `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 8] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
