//! Error types for oktactl invocations.
//!
//! Every invocation ends in exactly one of: a normalized [`Outcome`], or one
//! of the errors below. Validation errors are raised before any request is
//! sent; transport and API errors abort the remaining steps of a multi-step
//! action.
//!
//! [`Outcome`]: crate::resource::Outcome

/// Top-level error for a single invocation.
#[derive(Debug, thiserror::Error)]
pub enum OktaError {
    /// The invocation was rejected before reaching the network
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The request never produced an HTTP response
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The backend answered with a status outside the expected set
    #[error("Fail: {reason}")]
    Api {
        status: u16,
        reason: String,
        url: String,
    },
}

impl OktaError {
    /// HTTP status of the failure, when the backend produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            OktaError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// URL of the failing request, when one was sent
    pub fn url(&self) -> Option<&str> {
        match self {
            OktaError::Api { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Problems with the invocation itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("action '{action}' is not supported for resource '{kind}'")]
    UnsupportedAction { kind: String, action: String },

    #[error("parameter '{name}' is not accepted by '{kind} {action}'")]
    UnknownParameter {
        kind: String,
        action: String,
        name: String,
    },

    #[error("parameter '{name}' expects a {expected} value")]
    InvalidValue { name: String, expected: String },

    #[error("incomplete credentials: {0}")]
    IncompleteCredentials(String),

    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),
}

/// Connection-level failures reported by a [`Transport`](crate::okta::http::Transport).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

pub type Result<T> = std::result::Result<T, OktaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_reason_phrase() {
        let err = OktaError::Api {
            status: 500,
            reason: "Internal Server Error".to_string(),
            url: "https://acme-admin.okta.com/api/v1/users/U1/lifecycle/deactivate".to_string(),
        };
        assert_eq!(err.to_string(), "Fail: Internal Server Error");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn validation_error_converts() {
        let err: OktaError = ValidationError::MissingParameter("id".to_string()).into();
        assert!(matches!(err, OktaError::Validation(_)));
        assert_eq!(err.status(), None);
        assert!(err.url().is_none());
    }
}
