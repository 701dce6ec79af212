use actix_web::{http::StatusCode, test, web, App};
use sales_dashboard::app::server::{configure, start_server, AppState};
use sales_dashboard::core::dashboard::AnalysisSettings;
use sales_dashboard::core::ingestion::build_dataset;
use sales_dashboard::domain::model::RawTable;
use sales_dashboard::utils::error::ErrorSeverity;
use sales_dashboard::{Dashboard, DashboardError};
use serde_json::Value;
use std::sync::Arc;

fn dashboard() -> Dashboard {
    let headers = ["Date", "Customer_ID", "Location", "Purchase Category", "Quantity"];
    let rows = [
        ["2023-01-05", "C1", "North", "Books", "2"],
        ["2023-01-05", "C1", "North", "Toys", "1"],
        ["2023-02-10", "C2", "South", "Books", "1"],
        ["2024-03-15", "C3", "East", "Garden", "5"],
    ];
    let raw = RawTable {
        headers: headers.iter().map(|s| s.to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect(),
    };
    let dataset = build_dataset(&raw, "memory").expect("dataset builds");
    Dashboard::new(Arc::new(dataset), AnalysisSettings::default())
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState {
                    dashboard: dashboard(),
                }))
                .configure(configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_index_serves_page() {
    let app = app!();
    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("Customer Sales Analysis"));
    assert!(html.contains("year-dropdown"));
}

#[actix_web::test]
async fn test_year_and_month_options() {
    let app = app!();

    let years: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/years").to_request(),
    )
    .await;
    assert_eq!(years[0]["value"], 2023);
    assert_eq!(years[1]["value"], 2024);

    let months: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/months?year=2023").to_request(),
    )
    .await;
    let values: Vec<i64> = months
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["value"].as_i64().unwrap())
        .collect();
    assert_eq!(values, vec![1, 2]);

    let none: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/months").to_request(),
    )
    .await;
    assert_eq!(none, Value::Array(vec![]));
}

#[actix_web::test]
async fn test_chart_and_measure_options() {
    let app = app!();

    let charts: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/charts").to_request(),
    )
    .await;
    assert_eq!(charts.as_array().unwrap().len(), 5);
    assert_eq!(charts[0]["value"], "trends-over-time");

    // No Revenue column in this dataset.
    let measures: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/measures").to_request(),
    )
    .await;
    let values: Vec<&str> = measures
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, vec!["transactions", "quantity"]);
}

#[actix_web::test]
async fn test_chart_defaults_to_trends() {
    let app = app!();

    let figure: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/chart").to_request(),
    )
    .await;
    assert_eq!(figure["data"][0]["type"], "scatter");
    assert_eq!(figure["data"][0]["x"].as_array().unwrap().len(), 3);
    assert!(figure["layout"]["title"]["text"].is_string());
}

#[actix_web::test]
async fn test_filtered_best_sellers() {
    let app = app!();

    let figure: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/chart?chart=best-selling-products&year=2023&month=1&measure=quantity")
            .to_request(),
    )
    .await;
    assert_eq!(figure["data"][0]["type"], "bar");
    assert_eq!(figure["data"][0]["x"], serde_json::json!(["Books", "Toys"]));
    assert_eq!(figure["data"][0]["y"], serde_json::json!([2.0, 1.0]));
}

#[actix_web::test]
async fn test_summary_reports_load() {
    let app = app!();

    let summary: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/summary").to_request(),
    )
    .await;
    assert_eq!(summary["source"], "memory");
    assert_eq!(summary["loaded_rows"], 4);
    assert_eq!(summary["rejected_rows"], 0);
}

#[actix_web::test]
async fn test_bad_queries_are_rejected() {
    let app = app!();

    for uri in [
        "/api/chart?chart=pie-chart",
        "/api/chart?measure=profit",
        "/api/chart?year=twenty",
        "/api/chart?month=13",
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string(), "{}", uri);
    }
}

#[actix_web::test]
async fn test_port_in_use_is_server_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let err = start_server(dashboard(), "127.0.0.1", port)
        .err()
        .expect("second bind on the same port fails");

    match &err {
        DashboardError::ServerError { address, source } => {
            assert_eq!(address, &format!("127.0.0.1:{}", port));
            assert_eq!(source.kind(), std::io::ErrorKind::AddrInUse);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.severity(), ErrorSeverity::Medium);
}
