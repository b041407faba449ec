use thiserror::Error;

#[derive(Error, Debug)]
pub enum CarbonImportError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("API token is not set. Run `carbon-import config --set-token YOUR_TOKEN` or set CARBON_API_TOKEN")]
    MissingApiToken,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file type: {0} (use .csv, .xlsx, .xls, .xlsb or .ods)")]
    UnsupportedFile(String),

    #[error("No import files found: {0}")]
    NoInputFiles(String),

    #[error("CSV read error: {0}")]
    CsvRead(#[from] csv::Error),

    #[error("Spreadsheet read error: {0}")]
    SpreadsheetRead(String),

    #[error("API call failed: {0}")]
    ApiCall(String),

    #[error("Template generation failed: {0}")]
    TemplateGeneration(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] carbon_import_common::Error),
}

pub type Result<T> = std::result::Result<T, CarbonImportError>;
