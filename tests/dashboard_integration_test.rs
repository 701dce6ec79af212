use anyhow::Result;
use sales_dashboard::core::analysis::Measure;
use sales_dashboard::core::chart::ChartKind;
use sales_dashboard::core::dashboard::{analyse, AnalysisSettings};
use sales_dashboard::core::ingestion::DataLoader;
use sales_dashboard::domain::model::PeriodFilter;
use sales_dashboard::{ChartRequest, Dashboard, DashboardError, LocalStorage};
use std::fmt::Write as _;
use std::sync::Arc;
use tempfile::TempDir;

const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample_sales.csv");

async fn load_sample() -> Result<Dashboard> {
    let storage = LocalStorage::default();
    let dataset = DataLoader::new(&storage).load(SAMPLE, None).await?;
    Ok(Dashboard::new(Arc::new(dataset), AnalysisSettings::default()))
}

/// The bundled sample loads completely and yields the expected dropdowns.
#[tokio::test]
async fn test_sample_dataset_loads() -> Result<()> {
    let dashboard = load_sample().await?;

    let report = dashboard.load_report();
    assert_eq!(report.total_rows, 15);
    assert_eq!(report.loaded_rows, 15);
    assert_eq!(report.rejected_rows, 0);
    assert_eq!(report.undated_rows, 0);
    assert_eq!(report.columns.len(), 6);

    let years: Vec<i32> = dashboard.year_options().into_iter().map(|o| o.value).collect();
    assert_eq!(years, vec![2023, 2024]);

    let months: Vec<u32> = dashboard
        .month_options(Some(2024))
        .into_iter()
        .map(|o| o.value)
        .collect();
    assert_eq!(months, vec![1, 2, 3]);
    assert!(dashboard.month_options(None).is_empty());

    Ok(())
}

/// Books appears in the most transactions; Electronics earns the most revenue.
#[tokio::test]
async fn test_best_selling_products_by_measure() -> Result<()> {
    let dashboard = load_sample().await?;

    let by_count = dashboard.report(&PeriodFilter::all(), Measure::Transactions);
    assert_eq!(by_count.best_selling_products[0].category, "Books");
    assert_eq!(by_count.best_selling_products[0].total, 6.0);

    let by_revenue = dashboard.report(&PeriodFilter::all(), Measure::Revenue);
    assert_eq!(by_revenue.best_selling_products[0].category, "Electronics");
    assert!((by_revenue.best_selling_products[0].total - 649.97).abs() < 1e-9);

    Ok(())
}

/// A year and month filter only sees rows from that month.
#[tokio::test]
async fn test_period_filter_is_exact() -> Result<()> {
    let dashboard = load_sample().await?;

    let january = dashboard.report(&PeriodFilter::new(Some(2023), Some(1)), Measure::Transactions);
    assert_eq!(january.row_count, 3);
    assert_eq!(january.trends_over_time.len(), 1);
    assert_eq!(january.trends_over_time[0].total, 3.0);

    let year = dashboard.report(&PeriodFilter::new(Some(2023), None), Measure::Transactions);
    assert_eq!(year.row_count, 9);
    let monthly: Vec<f64> = year.trends_over_time.iter().map(|m| m.total).collect();
    assert_eq!(monthly, vec![3.0, 3.0, 3.0]);

    let empty = dashboard.report(&PeriodFilter::new(Some(2019), None), Measure::Transactions);
    assert_eq!(empty.row_count, 0);
    assert!(empty.best_selling_products.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_location_ties_break_by_name() -> Result<()> {
    let dashboard = load_sample().await?;
    let report = dashboard.report(&PeriodFilter::all(), Measure::Transactions);

    let regions: Vec<(&str, f64)> = report
        .location_distribution
        .iter()
        .map(|r| (r.category.as_str(), r.total))
        .collect();
    assert_eq!(
        regions,
        vec![("East", 4.0), ("North", 4.0), ("South", 4.0), ("West", 3.0)]
    );

    let pair_total: u64 = report.pair_products.iter().map(|p| p.frequency).sum();
    assert_eq!(pair_total, 8);

    Ok(())
}

/// Every chart renders a non-empty figure for the full sample.
#[tokio::test]
async fn test_every_chart_renders() -> Result<()> {
    let dashboard = load_sample().await?;

    for chart in ChartKind::ALL {
        let figure = dashboard.render(&ChartRequest {
            chart,
            ..Default::default()
        });
        assert!(!figure.is_empty(), "{:?} rendered no data", chart);
    }

    Ok(())
}

/// Large generated file: every analysis still produces output.
#[tokio::test]
async fn test_large_dataset() -> Result<()> {
    const ROWS: usize = 100_000;
    let regions = ["North", "South", "East", "West"];
    let products = ["Books", "Toys", "Electronics", "Clothing", "Garden"];

    let mut csv = String::from("Date,Customer_ID,Location,Purchase Category,Quantity,Revenue\n");
    for i in 0..ROWS {
        writeln!(
            csv,
            "{}-{:02}-{:02},C{:05},{},{},{},{:.2}",
            2021 + i % 3,
            1 + (i / 3) % 12,
            1 + i % 28,
            i % 5_000,
            regions[i % regions.len()],
            products[(i / 7) % products.len()],
            1 + i % 4,
            10.0 + (i % 50) as f64
        )?;
    }

    let temp_dir = TempDir::new()?;
    tokio::fs::write(temp_dir.path().join("large.csv"), csv).await?;

    let storage = LocalStorage::new(temp_dir.path());
    let dataset = DataLoader::new(&storage).load("large.csv", None).await?;
    assert_eq!(dataset.len(), ROWS);

    let report = analyse(
        &dataset,
        &PeriodFilter::all(),
        Measure::Quantity,
        &AnalysisSettings::default(),
    );
    assert_eq!(report.row_count, ROWS);
    assert_eq!(report.trends_over_time.len(), 36);
    assert_eq!(report.location_distribution.len(), 4);
    assert_eq!(report.best_selling_products.len(), 5);
    assert!(!report.pair_products.is_empty());
    assert!(!report.product_performance.is_empty());

    Ok(())
}

/// Bad cells are skipped or coerced instead of failing the whole load.
#[tokio::test]
async fn test_dirty_rows_are_reported() -> Result<()> {
    let temp_dir = TempDir::new()?;
    tokio::fs::write(
        temp_dir.path().join("dirty.csv"),
        "Date,Customer_ID,Location,Purchase Category,Quantity,Revenue\n\
         2023-05-01,C1,North,Books,1,10\n\
         not a date,C2,South,Toys,2,20\n\
         2023-05-03,C3,East,Books,lots,30\n\
         ,,,,,\n",
    )
    .await?;

    let storage = LocalStorage::new(temp_dir.path());
    let dataset = DataLoader::new(&storage).load("dirty.csv", None).await?;
    let report = dataset.load_report();

    assert_eq!(report.total_rows, 3);
    assert_eq!(report.loaded_rows, 2);
    assert_eq!(report.rejected_rows, 1);
    assert_eq!(report.undated_rows, 1);

    // The undated row counts overall but never inside a period.
    assert_eq!(dataset.filter(&PeriodFilter::all()).len(), 2);
    assert_eq!(dataset.filter(&PeriodFilter::new(Some(2023), None)).len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_header_only_file_is_empty_dataset() -> Result<()> {
    let temp_dir = TempDir::new()?;
    tokio::fs::write(
        temp_dir.path().join("empty.csv"),
        "Date,Customer_ID,Location,Purchase Category\n",
    )
    .await?;

    let storage = LocalStorage::new(temp_dir.path());
    let dataset = DataLoader::new(&storage).load("empty.csv", None).await?;
    assert!(dataset.is_empty());

    let dashboard = Dashboard::new(Arc::new(dataset), AnalysisSettings::default());
    assert!(dashboard.year_options().is_empty());
    assert!(dashboard.render(&ChartRequest::default()).is_empty());

    Ok(())
}

#[tokio::test]
async fn test_missing_and_unsupported_files_fail() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path());
    let loader = DataLoader::new(&storage);

    let missing = loader.load("nowhere.csv", None).await;
    assert!(matches!(missing, Err(DashboardError::IoError(_))));

    let unsupported = loader.load("sales.json", None).await;
    assert!(matches!(
        unsupported,
        Err(DashboardError::UnsupportedFormatError { .. })
    ));

    Ok(())
}
