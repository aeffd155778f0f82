//! Client error types

/// Errors returned by the navigator client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-success response; the message is the response body verbatim
    #[error("{message}")]
    Transport { status: u16, message: String },

    /// Superseded by a newer request
    #[error("Request cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("{0}")]
    InvalidInput(String),
}

impl ClientError {
    /// Cancellation is not a failure and should not reach user-visible error state
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// HTTP status of a transport error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Transport { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_message_is_verbatim() {
        let err = ClientError::Transport {
            status: 500,
            message: "find error: bad $regex".to_string(),
        };
        assert_eq!(err.to_string(), "find error: bad $regex");
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_cancelled() {
        assert!(ClientError::Cancelled.is_cancelled());
        assert_eq!(ClientError::Cancelled.status(), None);
    }
}
