use crate::value_objects::month::Month;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BacktestError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("missing columns {missing:?} in {}", path.display())]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("insufficient data for {asset}: need at least {required} observations, got {actual}")]
    InsufficientData {
        asset: String,
        required: usize,
        actual: usize,
    },

    #[error("alignment error: {0}")]
    Alignment(String),

    #[error("missing month {month} in {asset} price history")]
    MonthGap { asset: String, month: Month },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, BacktestError>;
