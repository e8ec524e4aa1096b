// errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrendAnalysisError {
    #[error("Not enough data: {0}")]
    InsufficientData(String),

    #[error("Could not retrieve data: {0}")]
    RetrievalFailure(String),

    #[error("Forecast model rejected the series: {0}")]
    ModelFitFailure(String),

    #[error("Could not classify text: {0}")]
    ClassificationFailure(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Date parse error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),
}

impl TrendAnalysisError {
    /// Informational outcomes: the caller reports them instead of treating them as faults.
    pub fn is_insufficient(&self) -> bool {
        matches!(
            self,
            TrendAnalysisError::InsufficientData(_) | TrendAnalysisError::ModelFitFailure(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TrendAnalysisError>;
