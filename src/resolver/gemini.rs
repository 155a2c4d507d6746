//! Generative Language API backend.
//!
//! Sends one `generateContent` call with Google Search grounding and a
//! schema-constrained JSON response, then lifts the answer text and the
//! grounding web references out of the first candidate.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::query::ResolutionRequest;

use super::http_client::{build_resolver_http_client, sanitize_api_error};
use super::{RawCitation, RawResolution, ResolveError, Resolver, ResolverSettings, resolve_api_key};

// ==================== Request Types ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    tools: Vec<Tool>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

// ==================== Response Types ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

// ==================== GeminiResolver ====================

/// Resolves media URLs through the Generative Language `generateContent` API.
pub struct GeminiResolver {
    client: Client,
    settings: ResolverSettings,
}

impl GeminiResolver {
    /// Creates a resolver from settings.
    ///
    /// The credential is not checked here; a missing key surfaces as
    /// [`ResolveError::Configuration`] on the first `resolve` call.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Configuration`] if HTTP client construction fails.
    #[tracing::instrument(skip_all, fields(model = %settings.model, base_url = %settings.base_url))]
    pub fn new(settings: ResolverSettings) -> Result<Self, ResolveError> {
        let client = build_resolver_http_client(
            "gemini",
            settings.connect_timeout,
            settings.read_timeout,
        )?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }
}

impl std::fmt::Debug for GeminiResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiResolver")
            .field("base_url", &self.settings.base_url)
            .field("model", &self.settings.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Resolver for GeminiResolver {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[tracing::instrument(skip(self, request), fields(resolver = "gemini", model = %self.settings.model))]
    async fn resolve(&self, request: &ResolutionRequest) -> Result<RawResolution, ResolveError> {
        let Some(api_key) = resolve_api_key(self.settings.api_key.as_deref()) else {
            return Err(ResolveError::missing_credential());
        };

        let body = build_request_body(request);
        let endpoint = self.endpoint();
        debug!(endpoint = %endpoint, "Calling generateContent");

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %sanitize_api_error(&e.to_string()), "generateContent request failed");
                ResolveError::resolution_failed("cannot reach the generative search service")
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            warn!(
                status = status.as_u16(),
                body = %sanitize_api_error(&detail),
                "generateContent returned an error status"
            );
            return Err(ResolveError::resolution_failed(&format!(
                "service returned HTTP {}",
                status.as_u16()
            )));
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to parse generateContent response envelope");
                ResolveError::resolution_failed("unexpected service response format")
            })?;

        let raw = extract_resolution(parsed)
            .ok_or_else(|| ResolveError::resolution_failed("service returned no payload"))?;
        debug!(
            payload_chars = raw.text.len(),
            citations = raw.citations.len(),
            "generateContent answered"
        );
        Ok(raw)
    }
}

// ==================== Helpers ====================

fn build_request_body(request: &ResolutionRequest) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part {
                text: request.instruction(),
            }],
        }],
        tools: vec![Tool {
            google_search: GoogleSearch {},
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: request.schema(),
            thinking_config: ThinkingConfig { thinking_budget: 0 },
        },
    }
}

/// Joins the first candidate's non-thought text parts and collects its web
/// grounding chunks. Returns `None` when there is no usable text.
fn extract_resolution(response: GenerateContentResponse) -> Option<RawResolution> {
    let candidate = response.candidates.into_iter().next()?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return None;
    }

    let citations = candidate
        .grounding_metadata
        .map(|metadata| {
            metadata
                .grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .map(|web| RawCitation {
                    uri: web.uri,
                    title: web.title,
                })
                .collect()
        })
        .unwrap_or_default();

    Some(RawResolution::with_citations(text, citations))
}
