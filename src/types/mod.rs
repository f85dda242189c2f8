//! Common error taxonomy for the Joigo client core.

use reqwest::StatusCode;

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The server could not be reached at all (DNS, refused connection, reset).
    #[error("Cannot reach server: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("Request rejected ({status}): {detail}")]
    Api { status: StatusCode, detail: String },

    /// A token-requiring action was attempted without a session.
    #[error("Please log in: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A chat message is already being sent from this widget.
    #[error("A request is already in flight")]
    Busy,
}

impl AppError {
    /// True when the failure happened before the server produced a response.
    ///
    /// Page-level reads use this to tell "cannot reach server" apart from
    /// "server rejected request".
    pub fn is_unreachable(&self) -> bool {
        matches!(self, AppError::Network(_))
    }

    /// HTTP status of a rejected request, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AppError::Parse(e.to_string())
        } else if let Some(status) = e.status() {
            AppError::Api {
                status,
                detail: e.to_string(),
            }
        } else {
            AppError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Why a page-level read failed, as shown next to a retry action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// The request never got a response.
    Unreachable,
    /// The server answered with an error.
    Rejected { detail: String },
}

impl From<&AppError> for LoadFailure {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::Network(_) => LoadFailure::Unreachable,
            AppError::Api { detail, .. } => LoadFailure::Rejected {
                detail: detail.clone(),
            },
            other => LoadFailure::Rejected {
                detail: other.to_string(),
            },
        }
    }
}

impl LoadFailure {
    /// Localised description for the error panel.
    pub fn message(&self, language: crate::i18n::Language) -> String {
        match self {
            LoadFailure::Unreachable => crate::i18n::t(language, "bookings_unreachable"),
            LoadFailure::Rejected { detail } => {
                crate::i18n::t_with(language, "bookings_rejected", &[("detail", detail.as_str())])
            }
        }
    }
}
