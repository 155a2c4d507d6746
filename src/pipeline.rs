//! End-to-end resolution of one URL: build, call, normalize.

use tracing::{debug, warn};

use crate::media::MediaRecord;
use crate::normalizer::normalize;
use crate::query::build_request;
use crate::resolver::{ResolveError, Resolver};

/// Resolves a raw URL string into a validated [`MediaRecord`].
///
/// Issues exactly one `resolver.resolve` call for non-empty input and none
/// for empty input. Failures are logged with their kind; the caller decides
/// what to display.
///
/// # Errors
///
/// Any [`ResolveError`] from request construction, the resolver, or the
/// normalizer.
pub async fn resolve_url(resolver: &dyn Resolver, raw_url: &str) -> Result<MediaRecord, ResolveError> {
    let request = build_request(raw_url)?;
    debug!(resolver = resolver.name(), url = %request.url(), "Resolving media URL");

    let outcome = match resolver.resolve(&request).await {
        Ok(raw) => normalize(&raw),
        Err(error) => Err(error),
    };

    if let Err(error) = &outcome {
        warn!(
            resolver = resolver.name(),
            kind = %error.kind(),
            error = %error,
            "Media resolution failed"
        );
    }
    outcome
}
