use thiserror::Error;

#[derive(Error, Debug)]
pub enum CarrierError {
    #[error("carrier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("carrier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("carrier rejected the request: {0}")]
    Rejected(String),

    #[error("malformed carrier response: {0}")]
    Malformed(String),
}

impl CarrierError {
    /// HTTP status the carrier answered with, when the failure came from one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            CarrierError::Status { status, .. } => Some(*status),
            CarrierError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
