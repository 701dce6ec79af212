use clap::Parser;
use sales_dashboard::app::server;
use sales_dashboard::config::LogFormat;
use sales_dashboard::core::ingestion::DataLoader;
use sales_dashboard::utils::error::ErrorSeverity;
use sales_dashboard::utils::{logger, validation::Validate};
use sales_dashboard::{
    CliArgs, Dashboard, DashboardError, LocalStorage, ReportEngine, SalesPipeline, Settings,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let settings = match args.into_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    match settings.log_format {
        LogFormat::Compact => logger::init_cli_logger(settings.verbose),
        LogFormat::Json => logger::init_json_logger(settings.verbose),
    }

    tracing::info!("Starting sales-dashboard");
    tracing::debug!("Settings: {:?}", settings);

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let result = if settings.export {
        export(settings).await
    } else {
        serve(settings).await
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ Dashboard failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn export(settings: Settings) -> Result<(), DashboardError> {
    let filter = settings.filter;
    let measure = settings.measure;
    let sink = LocalStorage::new(settings.output_path.clone());
    let pipeline =
        SalesPipeline::new(LocalStorage::default(), sink, settings).with_measure(measure);

    let output_path = ReportEngine::new(pipeline).run(&filter).await?;

    println!("✅ Report export completed successfully!");
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}

async fn serve(settings: Settings) -> Result<(), DashboardError> {
    let storage = LocalStorage::default();
    let dataset = DataLoader::new(&storage)
        .load(&settings.data_file, settings.sheet.as_deref())
        .await?;

    if dataset.is_empty() {
        tracing::warn!("No transactions were loaded; charts will be empty");
    }

    let dashboard = Dashboard::new(Arc::new(dataset), settings.analysis_settings());
    let running = server::start_server(dashboard, &settings.host, settings.port)?;

    println!(
        "📊 Dashboard running at http://{}:{} (Ctrl+C to stop)",
        settings.host, settings.port
    );
    running
        .await
        .map_err(|source| DashboardError::ServerError {
            address: format!("{}:{}", settings.host, settings.port),
            source,
        })?;

    tracing::info!("Dashboard stopped");
    Ok(())
}
