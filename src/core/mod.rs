pub mod analysis;
pub mod chart;
pub mod dashboard;
pub mod engine;
pub mod ingestion;
pub mod pipeline;

pub use crate::domain::model::{AnalysisReport, PeriodFilter, SalesDataset, Transaction};
pub use crate::domain::ports::{ConfigProvider, IngestionStrategy, Pipeline, Storage};
pub use crate::utils::error::Result;
