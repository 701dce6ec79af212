use crate::domain::model::{AnalysisReport, PeriodFilter, RawTable, SalesDataset};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn data_file(&self) -> &str;
    fn sheet(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn export_filename(&self) -> &str;
    fn top_n(&self) -> usize;
    fn pair_limit(&self) -> usize;
}

/// Turns the bytes of one data file into an untyped table.
pub trait IngestionStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn ingest(&self, data: &[u8]) -> Result<RawTable>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SalesDataset>;
    async fn transform(&self, dataset: &SalesDataset, filter: &PeriodFilter) -> Result<AnalysisReport>;
    async fn load(&self, report: AnalysisReport) -> Result<String>;
}
