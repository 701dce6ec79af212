use crate::domain::model::RawTable;
use crate::domain::ports::IngestionStrategy;
use crate::utils::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct CsvIngestion {
    delimiter: u8,
}

impl CsvIngestion {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn tsv() -> Self {
        Self { delimiter: b'\t' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Default for CsvIngestion {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestionStrategy for CsvIngestion {
    fn name(&self) -> &'static str {
        if self.delimiter == b'\t' {
            "tsv"
        } else {
            "csv"
        }
    }

    fn ingest(&self, data: &[u8]) -> Result<RawTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(data);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        tracing::debug!("Read {} {} rows", rows.len(), self.name());
        Ok(RawTable { headers, rows })
    }
}
