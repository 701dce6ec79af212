use crate::domain::model::RawTable;
use crate::domain::ports::IngestionStrategy;
use crate::utils::error::{DashboardError, Result};
use calamine::{open_workbook_auto_from_rs, Data, DataType, Range, Reader};
use std::io::Cursor;

/// Reads one worksheet of an Excel/ODS workbook. The first row is the header.
#[derive(Debug, Clone, Default)]
pub struct ExcelIngestion {
    sheet: Option<String>,
}

impl ExcelIngestion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(sheet: impl Into<String>) -> Self {
        Self {
            sheet: Some(sheet.into()),
        }
    }
}

impl IngestionStrategy for ExcelIngestion {
    fn name(&self) -> &'static str {
        "excel"
    }

    fn ingest(&self, data: &[u8]) -> Result<RawTable> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))?;

        let range = match &self.sheet {
            Some(name) => workbook.worksheet_range(name)?,
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| DashboardError::EmptyDatasetError {
                    message: "workbook contains no worksheets".to_string(),
                })??,
        };

        let table = range_to_table(&range);
        tracing::debug!(
            "Read {} rows from sheet {}",
            table.rows.len(),
            self.sheet.as_deref().unwrap_or("#0")
        );
        Ok(table)
    }
}

fn range_to_table(range: &Range<Data>) -> RawTable {
    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>());

    let headers = rows.next().unwrap_or_default();
    RawTable {
        headers,
        rows: rows.collect(),
    }
}

// Dates become ISO strings so every source goes through the same parser.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}
