use crate::domain::model::PeriodFilter;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self, filter: &PeriodFilter) -> Result<String> {
        tracing::info!("Starting report export");

        let dataset = self.pipeline.extract().await?;
        tracing::info!("Extracted {} transactions", dataset.len());
        if dataset.is_empty() {
            tracing::warn!("Dataset has no rows; the report tables will be empty");
        }

        let report = self.pipeline.transform(&dataset, filter).await?;
        tracing::info!(
            "Analysed {} transactions for year {:?}, month {:?}",
            report.row_count,
            filter.year,
            filter.month
        );

        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Report saved to: {}", output_path);

        Ok(output_path)
    }
}
