use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{flag} {reason}")]
    InvalidField {
        flag: &'static str,
        reason: &'static str,
    },
    #[error("invalid request payload: {0}")]
    Payload(String),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RequestError {
    pub(super) fn invalid(flag: &'static str, reason: &'static str) -> Self {
        Self::InvalidField { flag, reason }
    }
}
