use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Untyped cells exactly as a reader produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Date,
    CustomerId,
    Region,
    Product,
    Quantity,
    Revenue,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Date,
        Column::CustomerId,
        Column::Region,
        Column::Product,
        Column::Quantity,
        Column::Revenue,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::CustomerId => "Customer_ID",
            Column::Region => "Location",
            Column::Product => "Purchase Category",
            Column::Quantity => "Quantity",
            Column::Revenue => "Revenue",
        }
    }

    // Normalised header spellings: lowercase, no spaces/underscores/hyphens.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::Date => &["date", "orderdate", "transactiondate", "purchasedate"],
            Column::CustomerId => &["customerid", "customer", "customerno"],
            Column::Region => &["location", "region"],
            Column::Product => &["purchasecategory", "product", "category", "productcategory"],
            Column::Quantity => &["quantity", "qty", "units"],
            Column::Revenue => &["revenue", "sales", "amount", "total"],
        }
    }

    pub fn from_header(header: &str) -> Option<Column> {
        let normalised: String = header
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        Column::ALL
            .into_iter()
            .find(|column| column.aliases().contains(&normalised.as_str()))
    }
}

pub type ColumnSet = BTreeSet<Column>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transaction {
    pub date: Option<NaiveDateTime>,
    pub customer_id: Option<String>,
    pub region: Option<String>,
    pub product: Option<String>,
    pub quantity: Option<f64>,
    pub revenue: Option<f64>,
}

impl Transaction {
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    pub fn month(&self) -> Option<u32> {
        self.date.map(|d| d.month())
    }

    /// First day of the calendar month the transaction falls in.
    pub fn month_start(&self) -> Option<NaiveDate> {
        self.date
            .and_then(|d| NaiveDate::from_ymd_opt(d.year(), d.month(), 1))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl PeriodFilter {
    pub fn new(year: Option<i32>, month: Option<u32>) -> Self {
        Self { year, month }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.year.is_none() && self.month.is_none()
    }

    /// Year and month are checked independently; undated rows never match a
    /// bounded filter.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if self.is_unbounded() {
            return true;
        }
        if let Some(year) = self.year {
            if transaction.year() != Some(year) {
                return false;
            }
        }
        if let Some(month) = self.month {
            if transaction.month() != Some(month) {
                return false;
            }
        }
        true
    }
}

/// The loaded sales table. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    columns: ColumnSet,
    transactions: Vec<Transaction>,
    report: LoadReport,
}

impl SalesDataset {
    pub fn new(columns: ColumnSet, transactions: Vec<Transaction>) -> Self {
        let report = LoadReport {
            total_rows: transactions.len(),
            loaded_rows: transactions.len(),
            columns: columns.iter().copied().collect(),
            ..Default::default()
        };
        Self {
            columns,
            transactions,
            report,
        }
    }

    pub fn with_report(mut self, report: LoadReport) -> Self {
        self.report = report;
        self
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.transactions.iter().filter_map(Transaction::year).collect();
        years.into_iter().collect()
    }

    pub fn months(&self, year: i32) -> Vec<u32> {
        let months: BTreeSet<u32> = self
            .transactions
            .iter()
            .filter(|t| t.year() == Some(year))
            .filter_map(Transaction::month)
            .collect();
        months.into_iter().collect()
    }

    pub fn view(&self) -> DatasetView<'_> {
        self.filter(&PeriodFilter::all())
    }

    pub fn filter(&self, filter: &PeriodFilter) -> DatasetView<'_> {
        DatasetView {
            columns: &self.columns,
            rows: self
                .transactions
                .iter()
                .filter(|t| filter.matches(t))
                .collect(),
        }
    }
}

/// A borrowed subset of a dataset, produced by period filtering.
#[derive(Debug, Clone)]
pub struct DatasetView<'a> {
    columns: &'a ColumnSet,
    rows: Vec<&'a Transaction>,
}

impl<'a> DatasetView<'a> {
    pub fn columns(&self) -> &ColumnSet {
        self.columns
    }

    pub fn rows(&self) -> &[&'a Transaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn missing_columns(&self, required: &[Column]) -> Vec<Column> {
        required
            .iter()
            .copied()
            .filter(|c| !self.columns.contains(c))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub source: String,
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub rejected_rows: usize,
    pub undated_rows: usize,
    pub columns: Vec<Column>,
}

/// A row of an exported analysis table. `HEADERS` follows the serialised
/// field order, so a table with no rows still gets its header line.
pub trait TableRow: Serialize {
    const HEADERS: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month: NaiveDate,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairFrequency {
    pub product_1: String,
    pub product_2: String,
    pub frequency: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCategoryTotal {
    pub month: NaiveDate,
    pub category: String,
    pub total: f64,
}

impl TableRow for MonthlyTotal {
    const HEADERS: &'static [&'static str] = &["month", "total"];
}

impl TableRow for CategoryTotal {
    const HEADERS: &'static [&'static str] = &["category", "total"];
}

impl TableRow for PairFrequency {
    const HEADERS: &'static [&'static str] = &["product_1", "product_2", "frequency"];
}

impl TableRow for MonthlyCategoryTotal {
    const HEADERS: &'static [&'static str] = &["month", "category", "total"];
}

/// Every analysis over one filtered view, as exported.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub source: LoadReport,
    pub filter: PeriodFilter,
    pub row_count: usize,
    pub trends_over_time: Vec<MonthlyTotal>,
    pub location_distribution: Vec<CategoryTotal>,
    pub pair_products: Vec<PairFrequency>,
    pub best_selling_products: Vec<CategoryTotal>,
    pub product_performance: Vec<MonthlyCategoryTotal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(date: &str) -> Transaction {
        Transaction {
            date: NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S").ok(),
            ..Default::default()
        }
    }

    #[test]
    fn test_column_from_header_aliases() {
        assert_eq!(Column::from_header(" Customer_ID "), Some(Column::CustomerId));
        assert_eq!(Column::from_header("Purchase Category"), Some(Column::Product));
        assert_eq!(Column::from_header("LOCATION"), Some(Column::Region));
        assert_eq!(Column::from_header("order-date"), Some(Column::Date));
        assert_eq!(Column::from_header("Discount"), None);
    }

    #[test]
    fn test_period_filter_month_without_year() {
        let filter = PeriodFilter::new(None, Some(3));
        assert!(filter.matches(&tx("2023-03-05 10:00:00")));
        assert!(filter.matches(&tx("2024-03-20 10:00:00")));
        assert!(!filter.matches(&tx("2024-04-01 00:00:00")));
        assert!(!filter.matches(&Transaction::default()));
        assert!(PeriodFilter::all().matches(&Transaction::default()));
    }

    #[test]
    fn test_years_and_months_sorted_unique() {
        let dataset = SalesDataset::new(
            [Column::Date].into_iter().collect(),
            vec![
                tx("2024-05-01 00:00:00"),
                tx("2023-12-01 00:00:00"),
                tx("2024-01-15 00:00:00"),
                tx("2024-05-31 23:59:59"),
                Transaction::default(),
            ],
        );
        assert_eq!(dataset.years(), vec![2023, 2024]);
        assert_eq!(dataset.months(2024), vec![1, 5]);
        assert!(dataset.months(2022).is_empty());
        assert_eq!(dataset.filter(&PeriodFilter::new(Some(2024), Some(5))).len(), 2);
        assert_eq!(dataset.view().len(), 5);
    }
}
