//! Error types for metadata resolution.
//!
//! Every failure kind stays distinguishable for logging, while
//! [`ResolveError::user_message`] collapses them into the single string the
//! presentation layer displays.

use std::fmt;

use thiserror::Error;

/// Shown for transport failures and unusable or malformed payloads.
pub const RESOLUTION_FAILED_MESSAGE: &str = "Could not find video details. Please check the URL.";

/// Shown when the payload parsed but names no supported platform.
pub const UNSUPPORTED_PLATFORM_MESSAGE: &str =
    "Could not detect a supported platform (YouTube or Instagram).";

/// Shown for configuration problems and anything without a specific message.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred.";

/// Shown for empty input (the form simply does not submit).
pub const EMPTY_INPUT_MESSAGE: &str = "Paste a YouTube or Instagram link to get started.";

/// Errors that can occur while resolving a URL into a media record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The trimmed input was empty; nothing was sent
    #[error("input is empty\n  Suggestion: Paste a YouTube or Instagram link")]
    EmptyInput,

    /// The external service is not configured (missing credential, bad client setup)
    #[error("resolver is not configured: {reason}\n  Suggestion: {suggestion}")]
    Configuration {
        /// What is missing or invalid
        reason: String,
        /// How to fix the configuration
        suggestion: String,
    },

    /// The external call failed or returned nothing usable
    #[error("resolution failed: {reason}")]
    Resolution {
        /// Low-level cause, for logs only
        reason: String,
    },

    /// The payload did not parse against the response schema
    #[error("malformed response: {reason}")]
    MalformedResponse {
        /// Why the payload was rejected
        reason: String,
    },

    /// The payload parsed but the platform could not be identified
    #[error("unsupported platform: the service reported platform 'Unknown'")]
    UnsupportedPlatform,
}

impl ResolveError {
    /// Creates a `Configuration` error for a missing service credential.
    #[must_use]
    pub fn missing_credential() -> Self {
        Self::Configuration {
            reason: "no API key found for the generative search service".to_string(),
            suggestion: "Set GEMINI_API_KEY (or API_KEY), or add api_key to the config file"
                .to_string(),
        }
    }

    /// Creates a `Configuration` error.
    #[must_use]
    pub fn configuration(reason: &str, suggestion: &str) -> Self {
        Self::Configuration {
            reason: reason.to_string(),
            suggestion: suggestion.to_string(),
        }
    }

    /// Creates a `Resolution` error.
    #[must_use]
    pub fn resolution_failed(reason: &str) -> Self {
        Self::Resolution {
            reason: reason.to_string(),
        }
    }

    /// Creates a `MalformedResponse` error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Machine-readable failure kind for logs and telemetry.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::EmptyInput => FailureKind::EmptyInput,
            Self::Configuration { .. } => FailureKind::Configuration,
            Self::Resolution { .. } => FailureKind::Resolution,
            Self::MalformedResponse { .. } => FailureKind::MalformedResponse,
            Self::UnsupportedPlatform => FailureKind::UnsupportedPlatform,
        }
    }

    /// The single user-safe string displayed in the error state.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyInput => EMPTY_INPUT_MESSAGE,
            Self::Configuration { .. } => GENERIC_FAILURE_MESSAGE,
            Self::Resolution { .. } | Self::MalformedResponse { .. } => RESOLUTION_FAILED_MESSAGE,
            Self::UnsupportedPlatform => UNSUPPORTED_PLATFORM_MESSAGE,
        }
    }
}

/// Failure taxonomy used in structured log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    EmptyInput,
    Configuration,
    Resolution,
    MalformedResponse,
    UnsupportedPlatform,
}

impl FailureKind {
    /// Returns the stable label used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::Configuration => "configuration",
            Self::Resolution => "resolution",
            Self::MalformedResponse => "malformed_response",
            Self::UnsupportedPlatform => "unsupported_platform",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_and_malformed_share_user_message() {
        let transport = ResolveError::resolution_failed("connection reset");
        let malformed = ResolveError::malformed("expected value at line 1");
        assert_eq!(transport.user_message(), RESOLUTION_FAILED_MESSAGE);
        assert_eq!(malformed.user_message(), RESOLUTION_FAILED_MESSAGE);
        assert_ne!(transport.kind(), malformed.kind());
    }

    #[test]
    fn test_unsupported_platform_message_is_exact() {
        assert_eq!(
            ResolveError::UnsupportedPlatform.user_message(),
            "Could not detect a supported platform (YouTube or Instagram)."
        );
    }

    #[test]
    fn test_configuration_error_hides_details_from_user() {
        let err = ResolveError::missing_credential();
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        let msg = err.to_string();
        assert!(msg.contains("API key"), "log form should explain: {msg}");
        assert!(msg.contains("Suggestion"), "log form should suggest a fix");
    }

    #[test]
    fn test_user_message_never_leaks_reason() {
        let err = ResolveError::resolution_failed("HTTP 403: key AIzaSecret rejected");
        assert!(!err.user_message().contains("AIza"));
    }

    #[test]
    fn test_failure_kind_labels() {
        assert_eq!(FailureKind::MalformedResponse.to_string(), "malformed_response");
        assert_eq!(ResolveError::EmptyInput.kind().as_str(), "empty_input");
        assert_eq!(
            ResolveError::UnsupportedPlatform.kind(),
            FailureKind::UnsupportedPlatform
        );
    }

    #[test]
    fn test_resolve_error_clone() {
        let err = ResolveError::malformed("bad json");
        let cloned = err.clone();
        assert_eq!(err, cloned);
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
