use std::fmt;

use super::input::InputError;
use crate::transport::TransportError;

/// Longest response excerpt carried inside a failure.
pub const MAX_BODY_EXCERPT: usize = 300;

/// Which remote call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallLabel {
    AuthToken,
    SaveTmp,
}

impl CallLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallLabel::AuthToken => "authToken",
            CallLabel::SaveTmp => "save-tmp",
        }
    }
}

impl fmt::Display for CallLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Http,
    Protocol,
    Application,
    Transport,
    InvalidInput,
}

/// The single failure type a signup run can end in.
#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("{label} HTTP {status}: {body}")]
    Http {
        label: CallLabel,
        status: u16,
        body: String,
    },
    #[error("{label} returned an unusable body: {message}; body={body}")]
    Protocol {
        label: CallLabel,
        message: String,
        body: String,
    },
    #[error("{label} failed: {body}")]
    Application { label: CallLabel, body: String },
    #[error("{label} transport failure: {source}")]
    Transport {
        label: CallLabel,
        #[source]
        source: TransportError,
    },
    #[error("unable to prepare http client: {0}")]
    ClientSetup(#[source] TransportError),
    #[error("invalid signup input: {0}")]
    InvalidInput(#[from] InputError),
}

impl SignupError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SignupError::Http { .. } => FailureKind::Http,
            SignupError::Protocol { .. } => FailureKind::Protocol,
            SignupError::Application { .. } => FailureKind::Application,
            SignupError::Transport { .. } | SignupError::ClientSetup(_) => FailureKind::Transport,
            SignupError::InvalidInput(_) => FailureKind::InvalidInput,
        }
    }

    /// The remote call that failed, if the failure came from one.
    pub fn label(&self) -> Option<CallLabel> {
        match self {
            SignupError::Http { label, .. }
            | SignupError::Protocol { label, .. }
            | SignupError::Application { label, .. }
            | SignupError::Transport { label, .. } => Some(*label),
            SignupError::ClientSetup(_) | SignupError::InvalidInput(_) => None,
        }
    }
}

pub(crate) fn excerpt(body: &str) -> String {
    body.chars().take(MAX_BODY_EXCERPT).collect()
}
