use thiserror::Error;

/// Errors that can occur while opening inputs or loading configuration.
///
/// Note the split from the [`ErrorCounter`](sheetcast_model::ErrorCounter):
/// conditions detected inside a sheet (bad titles, ambiguous column specs)
/// are counted and parsing continues; only failures of the outer machinery
/// (unreadable file, malformed config document) travel as `SheetError`.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Unsupported input format: {path}")]
    UnsupportedFormat { path: String },

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
