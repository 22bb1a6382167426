use derive_more::{Display, From};
use reqwest::StatusCode;

use crate::{api::ValidationError, session};

#[derive(Debug, Display, From)]
pub enum BuildError {
    #[display("invalid base URL: {_0}")]
    #[from]
    Url(url::ParseError),
    #[display("HTTP client could not be built: {_0}")]
    #[from]
    Http(reqwest::Error),
}

impl std::error::Error for BuildError {}

/// Network or authorization failure of an authenticated call.
#[derive(Debug, Display, From)]
pub enum FetchError {
    #[display("not logged in")]
    NoCredential,
    #[display("request failed: {_0}")]
    #[from]
    Transport(reqwest::Error),
    #[display("server responded with {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
}

impl FetchError {
    /// Explanation sent by the server, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            Self::NoCredential | Self::Transport(_) => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            Self::NoCredential => None,
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Display, From)]
pub enum AuthError {
    #[display("credentials rejected")]
    Rejected { detail: Option<String> },
    #[display("{_0}")]
    #[from]
    Fetch(FetchError),
    #[display("{_0}")]
    #[from]
    Session(session::Error),
}

impl std::error::Error for AuthError {}

#[derive(Debug, Display, From)]
pub enum CreateTicketError {
    #[display("{_0}")]
    #[from]
    Validation(ValidationError),
    #[display("{_0}")]
    #[from]
    Fetch(FetchError),
}

impl std::error::Error for CreateTicketError {}

#[derive(Debug, Display, From)]
pub enum RegisterError {
    #[display("{_0}")]
    #[from]
    Validation(ValidationError),
    #[display("{_0}")]
    #[from]
    Fetch(FetchError),
}

impl std::error::Error for RegisterError {}
