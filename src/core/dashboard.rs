use crate::core::analysis::{
    Analysis, BestSellingProducts, LocationDistribution, Measure, PairProductAnalysis,
    ProductPerformance, TrendsOverTime, DEFAULT_TOP_N,
};
use crate::core::chart::{self, ChartKind, Figure, DEFAULT_PAIR_LIMIT};
use crate::domain::model::{AnalysisReport, DatasetView, LoadReport, PeriodFilter, SalesDataset};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub top_n: usize,
    pub pair_limit: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            pair_limit: DEFAULT_PAIR_LIMIT,
        }
    }
}

/// One dropdown selection set: which chart, over which period, measuring what.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ChartRequest {
    #[serde(default)]
    pub chart: ChartKind,
    pub year: Option<i32>,
    pub month: Option<u32>,
    #[serde(default)]
    pub measure: Measure,
}

impl ChartRequest {
    pub fn filter(&self) -> PeriodFilter {
        PeriodFilter::new(self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropdownOption<T> {
    pub label: String,
    pub value: T,
}

/// Read-only facade over the loaded dataset used by both the web UI and the
/// export pipeline.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Arc<SalesDataset>,
    settings: AnalysisSettings,
}

impl Dashboard {
    pub fn new(dataset: Arc<SalesDataset>, settings: AnalysisSettings) -> Self {
        Self { dataset, settings }
    }

    pub fn dataset(&self) -> &SalesDataset {
        &self.dataset
    }

    pub fn load_report(&self) -> &LoadReport {
        self.dataset.load_report()
    }

    pub fn year_options(&self) -> Vec<DropdownOption<i32>> {
        self.dataset
            .years()
            .into_iter()
            .map(|year| DropdownOption {
                label: year.to_string(),
                value: year,
            })
            .collect()
    }

    /// Months present in the selected year; nothing until a year is chosen.
    pub fn month_options(&self, year: Option<i32>) -> Vec<DropdownOption<u32>> {
        let Some(year) = year else {
            return Vec::new();
        };
        self.dataset
            .months(year)
            .into_iter()
            .map(|month| DropdownOption {
                label: month.to_string(),
                value: month,
            })
            .collect()
    }

    pub fn chart_options(&self) -> Vec<DropdownOption<ChartKind>> {
        ChartKind::ALL
            .into_iter()
            .map(|kind| DropdownOption {
                label: kind.label().to_string(),
                value: kind,
            })
            .collect()
    }

    /// Measures whose source column exists in the dataset.
    pub fn measure_options(&self) -> Vec<DropdownOption<Measure>> {
        Measure::ALL
            .into_iter()
            .filter(|m| self.dataset.has_column(m.required_column()))
            .map(|measure| DropdownOption {
                label: measure.label().to_string(),
                value: measure,
            })
            .collect()
    }

    pub fn render(&self, request: &ChartRequest) -> Figure {
        let started = Instant::now();
        let view = self.dataset.filter(&request.filter());
        let measure = request.measure;

        let figure = match request.chart {
            ChartKind::TrendsOverTime => {
                chart::trends_figure(&TrendsOverTime { measure }.process(&view), measure)
            }
            ChartKind::LocationDistribution => {
                chart::location_figure(&LocationDistribution { measure }.process(&view), measure)
            }
            ChartKind::PairProductAnalysis => {
                chart::pairs_figure(&PairProductAnalysis.process(&view), self.settings.pair_limit)
            }
            ChartKind::BestSellingProducts => {
                let analysis = BestSellingProducts {
                    measure,
                    top_n: self.settings.top_n,
                };
                chart::best_selling_figure(&analysis.process(&view), measure)
            }
            ChartKind::ProductPerformance => {
                chart::performance_figure(&ProductPerformance { measure }.process(&view), measure)
            }
        };

        tracing::debug!(
            chart = ?request.chart,
            year = ?request.year,
            month = ?request.month,
            rows = view.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rendered chart"
        );
        figure
    }

    pub fn report(&self, filter: &PeriodFilter, measure: Measure) -> AnalysisReport {
        analyse(&self.dataset, filter, measure, &self.settings)
    }
}

/// Runs every analysis over one filtered view.
pub fn analyse(
    dataset: &SalesDataset,
    filter: &PeriodFilter,
    measure: Measure,
    settings: &AnalysisSettings,
) -> AnalysisReport {
    let view: DatasetView<'_> = dataset.filter(filter);

    AnalysisReport {
        source: dataset.load_report().clone(),
        filter: *filter,
        row_count: view.len(),
        trends_over_time: TrendsOverTime { measure }.process(&view),
        location_distribution: LocationDistribution { measure }.process(&view),
        pair_products: PairProductAnalysis.process(&view),
        best_selling_products: BestSellingProducts {
            measure,
            top_n: settings.top_n,
        }
        .process(&view),
        product_performance: ProductPerformance { measure }.process(&view),
    }
}
