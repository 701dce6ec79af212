use crate::config::toml_config::FileConfig;
use crate::config::{LogFormat, Settings};
use crate::core::analysis::Measure;
use crate::domain::model::PeriodFilter;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "Interactive sales analysis dashboard for Excel/CSV datasets")]
pub struct CliArgs {
    /// Sales data file (.xlsx, .xls, .xlsm, .xlsb, .ods, .csv, .tsv)
    #[arg(short, long)]
    pub data_file: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Worksheet to read from an Excel workbook (defaults to the first)
    #[arg(long)]
    pub sheet: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    /// Number of products shown in the best-selling chart
    #[arg(long)]
    pub top_n: Option<usize>,

    /// What the exported tables aggregate
    #[arg(long, value_enum)]
    pub measure: Option<Measure>,

    /// Write every analysis to a ZIP of CSV files instead of serving the dashboard
    #[arg(long)]
    pub export: bool,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Restrict the export to one year
    #[arg(long)]
    pub year: Option<i32>,

    /// Restrict the export to one month (1-12)
    #[arg(long)]
    pub month: Option<u32>,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    /// Resolves defaults, then the config file, then these flags.
    pub fn into_settings(self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(path) = &self.config {
            settings.apply_file(FileConfig::from_file(path)?);
        }

        if let Some(data_file) = self.data_file {
            settings.data_file = data_file;
        }
        if self.sheet.is_some() {
            settings.sheet = self.sheet;
        }
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(top_n) = self.top_n {
            settings.top_n = top_n;
        }
        if let Some(measure) = self.measure {
            settings.measure = measure;
        }
        if let Some(output_path) = self.output_path {
            settings.output_path = output_path;
        }
        if let Some(format) = self.log_format {
            settings.log_format = format;
        }
        settings.export = self.export;
        settings.verbose = settings.verbose || self.verbose;
        settings.filter = PeriodFilter::new(self.year, self.month);

        Ok(settings)
    }
}
