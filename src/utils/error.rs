use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Excel processing error: {0}")]
    ExcelError(#[from] calamine::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported data file format: {path}")]
    UnsupportedFormatError { path: String },

    #[error("Dataset is empty: {message}")]
    EmptyDatasetError { message: String },

    #[error("Server error on {address}: {source}")]
    ServerError {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl DashboardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::ExcelError(_)
            | Self::CsvError(_)
            | Self::UnsupportedFormatError { .. }
            | Self::EmptyDatasetError { .. } => ErrorCategory::Input,
            Self::SerializationError(_) => ErrorCategory::Processing,
            Self::ZipError(_) => ErrorCategory::Output,
            Self::IoError(_) | Self::ServerError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EmptyDatasetError { .. } => ErrorSeverity::Medium,
            Self::ServerError { source, .. } if source.kind() == std::io::ErrorKind::AddrInUse => {
                ErrorSeverity::Medium
            }
            Self::ServerError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                "Check that the data file path exists and is readable".to_string()
            }
            Self::IoError(_) => "Check file permissions and available disk space".to_string(),
            Self::ExcelError(_) => {
                "Make sure the workbook is a valid Excel file and the sheet name is correct"
                    .to_string()
            }
            Self::CsvError(_) => {
                "Make sure every row has the same number of columns as the header".to_string()
            }
            Self::UnsupportedFormatError { .. } => {
                "Use a .xlsx, .xls, .xlsm, .xlsb, .ods, .csv or .tsv file".to_string()
            }
            Self::EmptyDatasetError { .. } => {
                "Add a header row and at least one data row to the file".to_string()
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Review the command line flags and the TOML configuration file".to_string()
            }
            Self::ZipError(_) => "Check that the output directory is writable".to_string(),
            Self::SerializationError(_) => {
                "Run again with --verbose and inspect the offending rows".to_string()
            }
            Self::ServerError { source, .. } if source.kind() == std::io::ErrorKind::AddrInUse => {
                "Another process is using the port; pick a different --port".to_string()
            }
            Self::ServerError { .. } => {
                "Check that --host names a local interface, then restart the dashboard".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration. {}", self),
            ErrorCategory::Input => format!("Could not read the sales data. {}", self),
            ErrorCategory::Processing => format!("Failed to analyse the sales data. {}", self),
            ErrorCategory::Output => format!("Failed to write the report. {}", self),
            ErrorCategory::System => format!("System error. {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_suggests_checking_path() {
        let err = DashboardError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Sales_Data.xlsx",
        ));
        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("data file path"));
    }

    #[test]
    fn test_config_errors_share_category() {
        let err = DashboardError::InvalidConfigValueError {
            field: "server.port".to_string(),
            value: "0".to_string(),
            reason: "Value must be at least 1".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.user_friendly_message().starts_with("Invalid configuration."));
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_port_in_use_is_recoverable() {
        let err = DashboardError::ServerError {
            address: "127.0.0.1:8050".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        };
        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.recovery_suggestion().contains("--port"));
        assert!(err.to_string().contains("127.0.0.1:8050"));
    }
}
