// Adapters layer: concrete implementations for external systems (files, spreadsheets).

pub mod csv_source;
pub mod excel;
pub mod storage;

pub use csv_source::CsvIngestion;
pub use excel::ExcelIngestion;
pub use storage::LocalStorage;
