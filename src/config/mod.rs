#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::analysis::{Measure, DEFAULT_TOP_N};
use crate::core::chart::DEFAULT_PAIR_LIMIT;
use crate::core::dashboard::AnalysisSettings;
use crate::core::ingestion::supported_extensions;
use crate::core::ConfigProvider;
use crate::domain::model::PeriodFilter;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use toml_config::FileConfig;

pub const DEFAULT_DATA_FILE: &str = "Sales_Data.xlsx";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8050;
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_EXPORT_FILENAME: &str = "sales_report.zip";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Fully resolved settings: defaults, then the config file, then CLI flags.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub data_file: String,
    pub sheet: Option<String>,
    pub host: String,
    pub port: u16,
    pub top_n: usize,
    pub pair_limit: usize,
    pub measure: Measure,
    pub output_path: String,
    pub export_filename: String,
    pub export: bool,
    pub filter: PeriodFilter,
    pub log_format: LogFormat,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: DEFAULT_DATA_FILE.to_string(),
            sheet: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            top_n: DEFAULT_TOP_N,
            pair_limit: DEFAULT_PAIR_LIMIT,
            measure: Measure::default(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            export_filename: DEFAULT_EXPORT_FILENAME.to_string(),
            export: false,
            filter: PeriodFilter::all(),
            log_format: LogFormat::default(),
            verbose: false,
        }
    }
}

impl Settings {
    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(path) = file.data.file {
            self.data_file = path;
        }
        if file.data.sheet.is_some() {
            self.sheet = file.data.sheet;
        }
        if let Some(host) = file.server.host {
            self.host = host;
        }
        if let Some(port) = file.server.port {
            self.port = port;
        }
        if let Some(top_n) = file.analysis.top_n {
            self.top_n = top_n;
        }
        if let Some(pair_limit) = file.analysis.pair_limit {
            self.pair_limit = pair_limit;
        }
        if let Some(measure) = file.analysis.measure {
            self.measure = measure;
        }
        if let Some(output_path) = file.export.output_path {
            self.output_path = output_path;
        }
        if let Some(filename) = file.export.filename {
            self.export_filename = filename;
        }
        if let Some(format) = file.logging.format {
            self.log_format = format;
        }
        if let Some(verbose) = file.logging.verbose {
            self.verbose = verbose;
        }
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            top_n: self.top_n,
            pair_limit: self.pair_limit,
        }
    }
}

impl ConfigProvider for Settings {
    fn data_file(&self) -> &str {
        &self.data_file
    }

    fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn export_filename(&self) -> &str {
        &self.export_filename
    }

    fn top_n(&self) -> usize {
        self.top_n
    }

    fn pair_limit(&self) -> usize {
        self.pair_limit
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("data.file", &self.data_file)?;
        validate_file_extension("data.file", &self.data_file, &supported_extensions())?;
        validate_non_empty_string("server.host", &self.host)?;
        validate_positive_number("server.port", self.port as usize, 1)?;
        validate_positive_number("analysis.top_n", self.top_n, 1)?;
        validate_positive_number("analysis.pair_limit", self.pair_limit, 1)?;

        if self.export {
            validate_path("export.output_path", &self.output_path)?;
            validate_non_empty_string("export.filename", &self.export_filename)?;
        }

        if let Some(month) = self.filter.month {
            validate_range("filter.month", month, 1, 12)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.port, 8050);
        assert_eq!(settings.data_file(), "Sales_Data.xlsx");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = FileConfig::from_toml_str(
            "[data]\nfile = \"sales.csv\"\n[server]\nport = 9001\n[analysis]\ntop_n = 3\nmeasure = \"revenue\"\n",
        )
        .unwrap();

        let mut settings = Settings::default();
        settings.apply_file(file);

        assert_eq!(settings.data_file, "sales.csv");
        assert_eq!(settings.port, 9001);
        assert_eq!(settings.analysis_settings().top_n, 3);
        assert_eq!(settings.measure, Measure::Revenue);
        assert_eq!(settings.host, DEFAULT_HOST);
    }

    #[test]
    fn test_validation_failures() {
        let mut settings = Settings {
            data_file: "sales.json".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        settings.data_file = "sales.csv".to_string();
        settings.port = 0;
        assert!(settings.validate().is_err());

        settings.port = 8050;
        settings.filter = PeriodFilter::new(Some(2023), Some(13));
        assert!(settings.validate().is_err());

        settings.filter = PeriodFilter::new(Some(2023), Some(12));
        settings.top_n = 0;
        assert!(settings.validate().is_err());
    }
}
