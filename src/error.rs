use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Submission(#[from] SubmissionError),

    #[error("Export failed: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
}

/// The selected file could not be read as a spreadsheet.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Could not read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook has no worksheets")]
    NoWorksheet,

    #[error("Could not read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Input rejected before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select an Excel file.")]
    MissingFile,

    #[error("Please select District and Block.")]
    MissingLocation,

    #[error("No valid UDISE codes found in the file.")]
    NoIdentifiers,

    #[error("{0}")]
    InvalidNumber(&'static str),

    #[error("{0}")]
    InvalidTemplate(&'static str),

    #[error("{0}")]
    InvalidMedia(&'static str),
}

/// The backend call failed or answered with a non-success status.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid endpoint URL: {0}")]
    Endpoint(String),

    #[error("This file is too large to upload.")]
    TooLarge,
}

pub type Result<T> = std::result::Result<T, AdminError>;
