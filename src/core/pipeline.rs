use crate::core::analysis::Measure;
use crate::core::dashboard::{analyse, AnalysisSettings};
use crate::core::ingestion::DataLoader;
use crate::domain::model::{AnalysisReport, PeriodFilter, SalesDataset, TableRow};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{DashboardError, Result};
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

/// Loads the data file, runs every analysis and packs the tables into a ZIP
/// of CSV files.
pub struct SalesPipeline<S: Storage, C: ConfigProvider> {
    source: S,
    sink: S,
    config: C,
    measure: Measure,
}

impl<S: Storage, C: ConfigProvider> SalesPipeline<S, C> {
    pub fn new(source: S, sink: S, config: C) -> Self {
        Self {
            source,
            sink,
            config,
            measure: Measure::default(),
        }
    }

    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measure = measure;
        self
    }

    fn settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            top_n: self.config.top_n(),
            pair_limit: self.config.pair_limit(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SalesPipeline<S, C> {
    async fn extract(&self) -> Result<SalesDataset> {
        DataLoader::new(&self.source)
            .load(self.config.data_file(), self.config.sheet())
            .await
    }

    async fn transform(&self, dataset: &SalesDataset, filter: &PeriodFilter) -> Result<AnalysisReport> {
        let report = analyse(dataset, filter, self.measure, &self.settings());
        tracing::debug!(
            "Analysed {} rows: {} months, {} regions, {} pairs, {} products",
            report.row_count,
            report.trends_over_time.len(),
            report.location_distribution.len(),
            report.pair_products.len(),
            report.best_selling_products.len()
        );
        Ok(report)
    }

    async fn load(&self, report: AnalysisReport) -> Result<String> {
        let filename = self.config.export_filename();
        let output_path = Path::new(self.config.output_path())
            .join(filename)
            .to_string_lossy()
            .into_owned();

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            add_csv(&mut zip, "trends_over_time.csv", &report.trends_over_time)?;
            add_csv(&mut zip, "location_distribution.csv", &report.location_distribution)?;
            add_csv(&mut zip, "pair_product_analysis.csv", &report.pair_products)?;
            add_csv(&mut zip, "best_selling_products.csv", &report.best_selling_products)?;
            add_csv(&mut zip, "product_performance.csv", &report.product_performance)?;

            zip.start_file::<_, ()>("summary.json", FileOptions::default())?;
            let summary = serde_json::json!({
                "source": report.source,
                "filter": report.filter,
                "measure": self.measure,
                "row_count": report.row_count,
            });
            zip.write_all(serde_json::to_string_pretty(&summary)?.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing report archive ({} bytes)", zip_data.len());
        self.sink.write_file(filename, &zip_data).await?;

        Ok(output_path)
    }
}

fn add_csv<W, T>(zip: &mut ZipWriter<W>, name: &str, rows: &[T]) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
    T: TableRow,
{
    zip.start_file::<_, ()>(name, FileOptions::default())?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::IoError(e.into_error()))?;

    zip.write_all(&bytes)?;
    Ok(())
}
