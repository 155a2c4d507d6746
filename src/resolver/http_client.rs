//! Shared HTTP client construction policy for the resolver.
//!
//! Centralizes timeout, user-agent, compression and proxy handling so the
//! service backend and any future backend behave the same on the wire.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

use crate::user_agent;

use super::ResolveError;

/// Maximum characters of a service error body kept for logs.
const MAX_API_ERROR_CHARS: usize = 200;

/// Builds a resolver HTTP client with the given timeouts.
///
/// `resolver_name` is used only for logging, not in the User-Agent header.
///
/// # Errors
///
/// Returns [`ResolveError::Configuration`] when client construction fails.
pub fn build_resolver_http_client(
    resolver_name: &str,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<Client, ResolveError> {
    match try_build_client(connect_timeout, read_timeout, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Some sandboxed macOS environments panic when querying system
            // proxy settings; retry with env-proxy lookup only.
            warn!(
                resolver = resolver_name,
                "Resolver client hit system proxy panic; using env-proxy fallback builder"
            );
            match try_build_client(connect_timeout, read_timeout, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(ResolveError::configuration(
                    "HTTP client construction panicked while initializing resolver networking",
                    "Check system proxy settings or set HTTPS_PROXY explicitly",
                )),
                Err(BuildClientFailure::Build(error)) => Err(ResolveError::configuration(
                    &format!("HTTP client construction failed: {error}"),
                    "Check TLS and proxy configuration",
                )),
            }
        }
        Err(BuildClientFailure::Build(error)) => Err(ResolveError::configuration(
            &format!("HTTP client construction failed: {error}"),
            "Check TLS and proxy configuration",
        )),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    connect_timeout: Duration,
    read_timeout: Duration,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(connect_timeout, read_timeout);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(connect_timeout: Duration, read_timeout: Duration) -> ClientBuilder {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(read_timeout)
        .user_agent(user_agent::default_resolver_user_agent())
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Scrubs Google API keys (`AIza...`) from text destined for logs.
#[must_use]
pub fn scrub_api_keys(input: &str) -> String {
    const PREFIX: &str = "AIza";
    let mut scrubbed = input.to_string();
    let mut search_from = 0;

    while let Some(rel) = scrubbed[search_from..].find(PREFIX) {
        let start = search_from + rel;
        let content_start = start + PREFIX.len();
        let end = scrubbed[content_start..]
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_')))
            .map_or(scrubbed.len(), |(i, _)| content_start + i);

        if end == content_start {
            search_from = content_start;
            continue;
        }

        scrubbed.replace_range(start..end, "[REDACTED]");
        search_from = start + "[REDACTED]".len();
    }

    scrubbed
}

/// Scrubs secrets and truncates a service error body for logging.
#[must_use]
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_api_keys(input);
    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed;
    }

    let truncated: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
    format!("{truncated}...")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_with_short_timeouts() {
        let client = build_resolver_http_client(
            "gemini",
            Duration::from_secs(1),
            Duration::from_secs(2),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_scrub_api_keys_redacts_google_key() {
        let text = "API key not valid: AIzaSyD-abc_123XYZ. Please pass a valid API key.";
        let scrubbed = scrub_api_keys(text);
        assert!(!scrubbed.contains("AIzaSyD"));
        assert!(scrubbed.contains("[REDACTED]. Please"));
    }

    #[test]
    fn test_scrub_api_keys_leaves_bare_prefix() {
        assert_eq!(scrub_api_keys("AIza"), "AIza");
        assert_eq!(scrub_api_keys("no secrets here"), "no secrets here");
    }

    #[test]
    fn test_sanitize_api_error_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_api_error(&body);
        assert_eq!(sanitized.chars().count(), MAX_API_ERROR_CHARS + 3);
        assert!(sanitized.ends_with("..."));
    }
}
