use crate::core::dashboard::{ChartRequest, Dashboard};
use crate::utils::error::{DashboardError, Result};
use actix_web::{
    dev::Server, error::InternalError, get, web, App, HttpResponse, HttpServer, Responder,
};
use serde::Deserialize;
use serde_json::json;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub struct AppState {
    pub dashboard: Dashboard,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

#[get("/summary")]
async fn summary(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.dashboard.load_report())
}

#[get("/years")]
async fn years(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.dashboard.year_options())
}

#[get("/months")]
async fn months(data: web::Data<AppState>, query: web::Query<MonthQuery>) -> impl Responder {
    HttpResponse::Ok().json(data.dashboard.month_options(query.year))
}

#[get("/charts")]
async fn charts(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.dashboard.chart_options())
}

#[get("/measures")]
async fn measures(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.dashboard.measure_options())
}

#[get("/chart")]
async fn chart(data: web::Data<AppState>, query: web::Query<ChartRequest>) -> impl Responder {
    let request = query.into_inner();

    if let Some(month) = request.month {
        if !(1..=12).contains(&month) {
            return HttpResponse::BadRequest()
                .json(json!({ "error": format!("month must be between 1 and 12, got {}", month) }));
        }
    }

    HttpResponse::Ok().json(data.dashboard.render(&request))
}

/// Registers the page and the `/api` routes. Shared by the server and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        tracing::debug!("Rejected query: {}", message);
        InternalError::from_response(err, HttpResponse::BadRequest().json(json!({ "error": message })))
            .into()
    });

    cfg.app_data(query_config).service(index).service(
        web::scope("/api")
            .service(summary)
            .service(years)
            .service(months)
            .service(charts)
            .service(measures)
            .service(chart),
    );
}

/// Binds `host:port`; a failed bind is reported as a `ServerError`.
pub fn start_server(dashboard: Dashboard, host: &str, port: u16) -> Result<Server> {
    let state = web::Data::new(AppState { dashboard });

    let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .workers(2)
        .bind((host, port))
        .map_err(|source| DashboardError::ServerError {
            address: format!("{}:{}", host, port),
            source,
        })?
        .run();

    tracing::info!("Dashboard listening on http://{}:{}", host, port);
    Ok(server)
}
