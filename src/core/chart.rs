//! Chart selection and Plotly-compatible figure construction.
//!
//! A [`Figure`] serialises to the `{ "data": [...], "layout": {...} }` shape that
//! `Plotly.newPlot` accepts, so the page can hand the JSON straight through.

use crate::core::analysis::Measure;
use crate::domain::model::{CategoryTotal, MonthlyCategoryTotal, MonthlyTotal, PairFrequency};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_PAIR_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    #[default]
    TrendsOverTime,
    LocationDistribution,
    PairProductAnalysis,
    BestSellingProducts,
    ProductPerformance,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::TrendsOverTime,
        ChartKind::LocationDistribution,
        ChartKind::PairProductAnalysis,
        ChartKind::BestSellingProducts,
        ChartKind::ProductPerformance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::TrendsOverTime => "Trends Over Time",
            ChartKind::LocationDistribution => "Regional Sales Analysis",
            ChartKind::PairProductAnalysis => "Pair Product Analysis",
            ChartKind::BestSellingProducts => "Best-Selling Products",
            ChartKind::ProductPerformance => "Product Performance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

impl Trace {
    fn line(name: Option<String>) -> Self {
        Self {
            kind: TraceKind::Scatter,
            mode: Some("lines+markers"),
            name,
            x: Vec::new(),
            y: Vec::new(),
        }
    }

    fn bar(name: Option<String>) -> Self {
        Self {
            kind: TraceKind::Bar,
            mode: None,
            name,
            x: Vec::new(),
            y: Vec::new(),
        }
    }

    fn push(&mut self, x: impl Into<String>, y: f64) {
        self.x.push(x.into());
        self.y.push(y);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Text,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<&'static str>,
    pub showlegend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    fn new(title: &str, x_label: &str, y_label: &str, data: Vec<Trace>) -> Self {
        let showlegend = data.len() > 1;
        Self {
            data,
            layout: Layout {
                title: text(title),
                xaxis: Axis { title: text(x_label) },
                yaxis: Axis { title: text(y_label) },
                barmode: None,
                showlegend,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|trace| trace.x.is_empty())
    }
}

fn text(value: &str) -> Text {
    Text {
        text: value.to_string(),
    }
}

fn total_label(measure: Measure) -> String {
    format!("Total {}", measure.label())
}

pub fn trends_figure(rows: &[MonthlyTotal], measure: Measure) -> Figure {
    let mut trace = Trace::line(None);
    for row in rows {
        trace.push(row.month.format("%Y-%m-%d").to_string(), row.total);
    }
    let data = if trace.x.is_empty() { Vec::new() } else { vec![trace] };
    Figure::new(ChartKind::TrendsOverTime.label(), "Date", &total_label(measure), data)
}

pub fn location_figure(rows: &[CategoryTotal], measure: Measure) -> Figure {
    Figure::new(
        ChartKind::LocationDistribution.label(),
        "Location",
        &total_label(measure),
        single_bar(rows),
    )
}

pub fn best_selling_figure(rows: &[CategoryTotal], measure: Measure) -> Figure {
    Figure::new(
        ChartKind::BestSellingProducts.label(),
        "Purchase Category",
        &total_label(measure),
        single_bar(rows),
    )
}

/// Top `limit` pairs; one stacked trace per second product.
pub fn pairs_figure(rows: &[PairFrequency], limit: usize) -> Figure {
    let mut traces: Vec<Trace> = Vec::new();
    for pair in rows.iter().take(limit) {
        let name = Some(pair.product_2.clone());
        let index = match traces.iter().position(|t| t.name == name) {
            Some(index) => index,
            None => {
                traces.push(Trace::bar(name));
                traces.len() - 1
            }
        };
        traces[index].push(pair.product_1.clone(), pair.frequency as f64);
    }

    let mut figure = Figure::new(
        "Top Product Pairs Purchased Together",
        "Product 1",
        "Frequency",
        traces,
    );
    figure.layout.barmode = Some("relative");
    figure.layout.showlegend = !figure.data.is_empty();
    figure
}

/// One line per product.
pub fn performance_figure(rows: &[MonthlyCategoryTotal], measure: Measure) -> Figure {
    let mut by_product: BTreeMap<&str, Trace> = BTreeMap::new();
    for row in rows {
        by_product
            .entry(row.category.as_str())
            .or_insert_with(|| Trace::line(Some(row.category.clone())))
            .push(row.month.format("%Y-%m-%d").to_string(), row.total);
    }

    let mut figure = Figure::new(
        "Product Performance Over Time",
        "Month",
        &total_label(measure),
        by_product.into_values().collect(),
    );
    figure.layout.showlegend = !figure.data.is_empty();
    figure
}

fn single_bar(rows: &[CategoryTotal]) -> Vec<Trace> {
    if rows.is_empty() {
        return Vec::new();
    }
    let mut trace = Trace::bar(None);
    for row in rows {
        trace.push(row.category.clone(), row.total);
    }
    vec![trace]
}
