use crate::domain::model::{
    CategoryTotal, Column, DatasetView, MonthlyCategoryTotal, MonthlyTotal, PairFrequency,
    Transaction,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_TOP_N: usize = 10;

/// What gets aggregated per group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Measure {
    /// Rows carrying a customer id.
    #[default]
    Transactions,
    Quantity,
    Revenue,
}

impl Measure {
    pub const ALL: [Measure; 3] = [Measure::Transactions, Measure::Quantity, Measure::Revenue];

    pub fn required_column(&self) -> Column {
        match self {
            Measure::Transactions => Column::CustomerId,
            Measure::Quantity => Column::Quantity,
            Measure::Revenue => Column::Revenue,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Measure::Transactions => "Transactions",
            Measure::Quantity => "Quantity",
            Measure::Revenue => "Revenue",
        }
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            Measure::Transactions => "transactions",
            Measure::Quantity => "quantity",
            Measure::Revenue => "revenue",
        }
    }

    pub fn value(&self, transaction: &Transaction) -> f64 {
        match self {
            Measure::Transactions => {
                if transaction.customer_id.is_some() {
                    1.0
                } else {
                    0.0
                }
            }
            Measure::Quantity => transaction.quantity.unwrap_or(0.0),
            Measure::Revenue => transaction.revenue.unwrap_or(0.0),
        }
    }
}

pub trait Analysis {
    type Row: Serialize + Clone;

    fn name(&self) -> &'static str;

    fn required_columns(&self) -> Vec<Column>;

    /// Aggregates rows; callers guarantee the required columns exist.
    fn compute(&self, rows: &[&Transaction]) -> Vec<Self::Row>;

    /// Aggregates a view, yielding an empty table when a required column is
    /// absent from the dataset.
    fn process(&self, view: &DatasetView<'_>) -> Vec<Self::Row> {
        let missing = view.missing_columns(&self.required_columns());
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(Column::display_name).collect();
            tracing::warn!(
                "Required columns for {} are missing: {}",
                self.name(),
                names.join(", ")
            );
            return Vec::new();
        }
        self.compute(view.rows())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrendsOverTime {
    pub measure: Measure,
}

impl Analysis for TrendsOverTime {
    type Row = MonthlyTotal;

    fn name(&self) -> &'static str {
        "Trends Over Time"
    }

    fn required_columns(&self) -> Vec<Column> {
        vec![Column::Date, self.measure.required_column()]
    }

    fn compute(&self, rows: &[&Transaction]) -> Vec<MonthlyTotal> {
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for row in rows {
            if let Some(month) = row.month_start() {
                *totals.entry(month).or_insert(0.0) += self.measure.value(row);
            }
        }

        totals
            .into_iter()
            .map(|(month, total)| MonthlyTotal { month, total })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocationDistribution {
    pub measure: Measure,
}

impl Analysis for LocationDistribution {
    type Row = CategoryTotal;

    fn name(&self) -> &'static str {
        "Regional Sales Analysis"
    }

    fn required_columns(&self) -> Vec<Column> {
        vec![Column::Region, self.measure.required_column()]
    }

    fn compute(&self, rows: &[&Transaction]) -> Vec<CategoryTotal> {
        ranked(group_totals(rows, |t| t.region.as_deref(), self.measure))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PairProductAnalysis;

impl Analysis for PairProductAnalysis {
    type Row = PairFrequency;

    fn name(&self) -> &'static str {
        "Pair Product Analysis"
    }

    fn required_columns(&self) -> Vec<Column> {
        vec![Column::CustomerId, Column::Product]
    }

    fn compute(&self, rows: &[&Transaction]) -> Vec<PairFrequency> {
        let mut baskets: HashMap<&str, Vec<&str>> = HashMap::new();
        for row in rows {
            if let (Some(customer), Some(product)) = (row.customer_id.as_deref(), row.product.as_deref()) {
                baskets.entry(customer).or_default().push(product);
            }
        }

        // Pairs keep purchase order: (earlier, later).
        let mut counts: HashMap<(&str, &str), u64> = HashMap::new();
        for items in baskets.values() {
            for (i, first) in items.iter().enumerate() {
                for second in &items[i + 1..] {
                    *counts.entry((*first, *second)).or_insert(0) += 1;
                }
            }
        }

        let mut pairs: Vec<PairFrequency> = counts
            .into_iter()
            .map(|((product_1, product_2), frequency)| PairFrequency {
                product_1: product_1.to_string(),
                product_2: product_2.to_string(),
                frequency,
            })
            .collect();

        pairs.sort_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| a.product_1.cmp(&b.product_1))
                .then_with(|| a.product_2.cmp(&b.product_2))
        });
        pairs
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BestSellingProducts {
    pub measure: Measure,
    pub top_n: usize,
}

impl Default for BestSellingProducts {
    fn default() -> Self {
        Self {
            measure: Measure::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Analysis for BestSellingProducts {
    type Row = CategoryTotal;

    fn name(&self) -> &'static str {
        "Best-Selling Products"
    }

    fn required_columns(&self) -> Vec<Column> {
        vec![Column::Product, self.measure.required_column()]
    }

    fn compute(&self, rows: &[&Transaction]) -> Vec<CategoryTotal> {
        let mut top = ranked(group_totals(rows, |t| t.product.as_deref(), self.measure));
        top.truncate(self.top_n);
        top
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductPerformance {
    pub measure: Measure,
}

impl Analysis for ProductPerformance {
    type Row = MonthlyCategoryTotal;

    fn name(&self) -> &'static str {
        "Product Performance"
    }

    fn required_columns(&self) -> Vec<Column> {
        vec![Column::Date, Column::Product, self.measure.required_column()]
    }

    fn compute(&self, rows: &[&Transaction]) -> Vec<MonthlyCategoryTotal> {
        let mut totals: BTreeMap<(NaiveDate, &str), f64> = BTreeMap::new();
        for row in rows {
            if let (Some(month), Some(product)) = (row.month_start(), row.product.as_deref()) {
                *totals.entry((month, product)).or_insert(0.0) += self.measure.value(row);
            }
        }

        totals
            .into_iter()
            .map(|((month, category), total)| MonthlyCategoryTotal {
                month,
                category: category.to_string(),
                total,
            })
            .collect()
    }
}

fn group_totals<'a, F>(rows: &[&'a Transaction], key: F, measure: Measure) -> HashMap<&'a str, f64>
where
    F: Fn(&'a Transaction) -> Option<&'a str>,
{
    let mut totals = HashMap::new();
    for row in rows {
        if let Some(group) = key(*row) {
            *totals.entry(group).or_insert(0.0) += measure.value(row);
        }
    }
    totals
}

// Highest total first; ties by name.
fn ranked(totals: HashMap<&str, f64>) -> Vec<CategoryTotal> {
    let mut rows: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    rows
}
