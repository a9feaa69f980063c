use thiserror::Error;

/// Message shown when a failure carries no usable text.
pub const GENERIC_FAILURE: &str = "Engine failure.";

/// Failures at the inference boundary.
#[derive(Debug, Error)]
pub enum InsightError {
    /// The credential was never configured. Raised before any request is built.
    #[error("GEMINI_API_KEY not set; add it to your environment or a .env file")]
    MissingApiKey,

    /// The request never produced an HTTP response.
    #[error("{0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("{message}")]
    Service { status: Option<u16>, message: String },

    /// The service answered, but the body could not be understood.
    #[error("{0}")]
    MalformedResponse(String),
}

impl InsightError {
    pub fn service(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey)
    }

    /// HTTP status of a service failure, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => *status,
            _ => None,
        }
    }

    /// The text recorded as the conversation error.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        }
    }
}

impl From<reqwest::Error> for InsightError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL may carry query parameters; keep it out of messages.
        let err = err.without_url();
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_surfaces_underlying_message() {
        let err = InsightError::service(Some(429), "rate limited");
        assert_eq!(err.user_message(), "rate limited");
        assert_eq!(err.status(), Some(429));
        assert_eq!(InsightError::Transport("down".into()).status(), None);
    }

    #[test]
    fn empty_message_falls_back_to_generic_failure() {
        assert_eq!(InsightError::service(None, "").user_message(), GENERIC_FAILURE);
        assert_eq!(InsightError::Transport("  ".into()).user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let err = InsightError::MissingApiKey;
        assert!(err.is_configuration());
        assert!(err.user_message().contains("GEMINI_API_KEY"));
        assert!(!InsightError::Transport("down".into()).is_configuration());
    }
}
