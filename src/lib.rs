//! AetherLoad Core Library
//!
//! This library turns a pasted YouTube or Instagram link into a structured
//! description of the media (title, author, thumbnail, duration and a catalog
//! of download options) by querying a search-grounded generative service with
//! a strict output schema.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`media`] - Canonical media record and the shared output schema
//! - [`query`] - Request construction from raw user input
//! - [`resolver`] - Outbound structured-generation call (Gemini HTTP backend)
//! - [`normalizer`] - Validation and normalization of raw responses
//! - [`pipeline`] - End-to-end resolution of one URL
//! - [`session`] - Presentation state machine with supersession checks
//! - [`selector`] - Category filtering and simulated artifact generation
//! - [`connectivity`] - Online/offline signal shared with the interactive surface
//! - [`config`] - File and environment configuration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod connectivity;
pub mod media;
pub mod normalizer;
pub mod pipeline;
pub mod query;
pub mod resolver;
pub mod selector;
pub mod session;
pub(crate) mod user_agent;
pub(crate) mod utils;

// Re-export commonly used types
pub use config::{
    FileConfig, LoadedConfig, VerbositySetting, load_config_from_path, load_default_file_config,
    resolve_default_config_path,
};
pub use connectivity::{Connectivity, probe_online, probe_target, spawn_monitor};
pub use media::{Citation, DownloadOption, MediaRecord, OptionType, Platform, response_schema};
pub use normalizer::normalize;
pub use pipeline::resolve_url;
pub use query::{ResolutionRequest, build_request};
pub use resolver::{
    FailureKind, GeminiResolver, RawCitation, RawResolution, ResolveError, Resolver,
    ResolverSettings, resolve_api_key,
};
pub use selector::{
    Artifact, ArtifactGenerator, DEFAULT_ARTIFACT_DELAY_MS, NO_OPTIONS_MESSAGE, OptionSelector,
    OptionView, QualityTier, SelectError, filter_options,
};
pub use session::{Session, SessionController, SessionSnapshot, Status, Ticket, View};
