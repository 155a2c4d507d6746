//! Outbound structured-generation call.
//!
//! A [`Resolver`] takes a [`ResolutionRequest`] and performs exactly one call
//! to an external search-grounded generation service, returning the raw
//! textual payload plus any grounding references. Parsing and validation are
//! left to [`crate::normalizer`].
//!
//! # Architecture
//!
//! - [`Resolver`] - Async trait implemented by service backends and test fixtures
//! - [`GeminiResolver`] - Generative Language API backend
//! - [`RawResolution`] - Unparsed payload and raw citations
//! - [`ResolveError`] - Failure taxonomy shared by the whole pipeline
//!
//! # Example
//!
//! ```no_run
//! use aetherload_core::query::build_request;
//! use aetherload_core::resolver::{GeminiResolver, Resolver, ResolverSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = GeminiResolver::new(ResolverSettings::default())?;
//! let request = build_request("https://youtu.be/abc123")?;
//! let raw = resolver.resolve(&request).await?;
//! println!("{} citation(s)", raw.citations.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod gemini;
mod http_client;

pub use error::{
    EMPTY_INPUT_MESSAGE, FailureKind, GENERIC_FAILURE_MESSAGE, RESOLUTION_FAILED_MESSAGE,
    ResolveError, UNSUPPORTED_PLATFORM_MESSAGE,
};
pub use gemini::GeminiResolver;
pub use http_client::{build_resolver_http_client, sanitize_api_error, scrub_api_keys};

use std::time::Duration;

use async_trait::async_trait;

use crate::query::ResolutionRequest;

/// Default Generative Language API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model used for resolution.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Default connect timeout for resolver requests.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default read timeout; search grounding makes responses slow.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;

/// Environment variables consulted for the service credential, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// A grounding reference as reported by the service, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCitation {
    pub uri: Option<String>,
    pub title: Option<String>,
}

/// Unparsed response of one resolution call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResolution {
    /// Structured payload as text (expected to be a JSON object).
    pub text: String,
    /// Grounding web references attached to the answer.
    pub citations: Vec<RawCitation>,
}

impl RawResolution {
    /// Creates a raw resolution with no citations.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    /// Creates a raw resolution with citations.
    #[must_use]
    pub fn with_citations(text: impl Into<String>, citations: Vec<RawCitation>) -> Self {
        Self {
            text: text.into(),
            citations,
        }
    }
}

/// Connection and model settings for a service backend.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub base_url: String,
    pub model: String,
    /// Explicit credential; `None` falls back to [`API_KEY_ENV_VARS`] at resolve time.
    pub api_key: Option<String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
        }
    }
}

/// Resolves the service credential: explicit value first, then environment.
///
/// Values are trimmed; empty values count as missing.
#[must_use]
pub fn resolve_api_key(explicit: Option<&str>) -> Option<String> {
    if let Some(raw) = explicit {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }

    API_KEY_ENV_VARS.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Trait implemented by structured-generation backends.
///
/// # Object Safety
///
/// Uses `async_trait` so the session can hold an `Arc<dyn Resolver>` and tests
/// can substitute deterministic fixtures.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Returns the backend's name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Issues exactly one call for `request` and returns the raw payload.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Configuration`] before any network attempt when the
    /// backend is not configured; [`ResolveError::Resolution`] when the call
    /// fails or returns no payload.
    async fn resolve(&self, request: &ResolutionRequest) -> Result<RawResolution, ResolveError>;
}
