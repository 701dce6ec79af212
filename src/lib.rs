pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;
pub use config::Settings;

pub use adapters::LocalStorage;
pub use crate::core::{
    dashboard::{ChartRequest, Dashboard},
    engine::ReportEngine,
    pipeline::SalesPipeline,
};
pub use utils::error::{DashboardError, Result};
