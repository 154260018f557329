use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalaryAnalystError {
    #[error("Payslip text is empty")]
    EmptyPayslip,

    #[error("No tax rules for {country} {tax_year}")]
    UnsupportedJurisdiction { country: String, tax_year: String },

    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    #[error("Cannot {action} while {step}")]
    InvalidTransition { action: &'static str, step: String },

    #[error("Invalid payslip component '{field}': {details}")]
    InvalidComponent { field: String, details: String },

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("LLM API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Rendering error: {0}")]
    Rendering(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "openai")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SalaryAnalystError>;
