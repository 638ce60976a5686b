use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid time range '{input}': {reason}")]
    InvalidTimeRange { input: String, reason: String },
    #[error("invalid timezone '{0}'")]
    InvalidTimezone(String),
    #[error("invalid deadline '{0}': expected RFC 3339 or a duration like 24h")]
    InvalidDeadline(String),
    #[error("poll requires {min}-{max} options, got {got}")]
    OptionCount { min: usize, max: usize, got: usize },
}

impl CoreError {
    pub(crate) fn time_range(input: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidTimeRange {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
