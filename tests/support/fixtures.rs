//! Deterministic resolvers and payloads shared by integration tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use aetherload_core::{RawCitation, RawResolution, ResolutionRequest, ResolveError, Resolver};
use async_trait::async_trait;
use tokio::sync::oneshot;

pub const YOUTUBE_PAYLOAD: &str = r#"{
    "title": "Abc 123 Live Session",
    "platform": "YouTube",
    "author": "Abc Channel",
    "duration": "4:12",
    "thumbnailUrl": "https://i.ytimg.com/vi/abc123/maxresdefault.jpg",
    "options": [
        {"quality": "2160p (4K)", "size": "520 MB", "format": "mp4", "type": "video_audio"},
        {"quality": "320kbps (High)", "size": "9 MB", "format": "mp3", "type": "audio_only"},
        {"quality": "1080p", "size": "140 MB", "format": "webm", "type": "video_only"}
    ]
}"#;

pub const UNKNOWN_PAYLOAD: &str = r#"{
    "title": "Random page",
    "platform": "Unknown",
    "author": "",
    "thumbnailUrl": "",
    "options": []
}"#;

pub fn instagram_payload(title: &str) -> String {
    format!(
        r#"{{"title":"{title}","platform":"Instagram","author":"@creator",
            "thumbnailUrl":"https://scontent.cdninstagram.com/v/t51/{title}.jpg",
            "options":[{{"quality":"720p","size":"18 MB","format":"mp4","type":"video_audio"}}]}}"#
    )
}

pub fn web_citation(uri: &str, title: &str) -> RawCitation {
    RawCitation {
        uri: Some(uri.to_string()),
        title: Some(title.to_string()),
    }
}

/// Answers every call with the same outcome and counts calls.
pub struct StaticResolver {
    outcome: Result<RawResolution, ResolveError>,
    calls: AtomicUsize,
}

impl StaticResolver {
    pub fn answering(text: impl Into<String>) -> Self {
        Self::with_outcome(Ok(RawResolution::new(text)))
    }

    pub fn with_outcome(outcome: Result<RawResolution, ResolveError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    fn name(&self) -> &str {
        "static"
    }

    async fn resolve(&self, _request: &ResolutionRequest) -> Result<RawResolution, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Holds each call open until the test releases the gate for that URL.
pub struct GatedResolver {
    gates: Mutex<HashMap<String, oneshot::Receiver<Result<RawResolution, ResolveError>>>>,
    calls: AtomicUsize,
}

pub type Gate = oneshot::Sender<Result<RawResolution, ResolveError>>;

impl GatedResolver {
    pub fn new<'a>(urls: impl IntoIterator<Item = &'a str>) -> (Self, HashMap<String, Gate>) {
        let mut receivers = HashMap::new();
        let mut senders = HashMap::new();
        for url in urls {
            let (tx, rx) = oneshot::channel();
            receivers.insert(url.to_string(), rx);
            senders.insert(url.to_string(), tx);
        }
        (
            Self {
                gates: Mutex::new(receivers),
                calls: AtomicUsize::new(0),
            },
            senders,
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Resolver for GatedResolver {
    fn name(&self) -> &str {
        "gated"
    }

    async fn resolve(&self, request: &ResolutionRequest) -> Result<RawResolution, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().remove(request.url());
        match gate {
            Some(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(ResolveError::resolution_failed("gate dropped"))),
            None => Err(ResolveError::resolution_failed("no gate for url")),
        }
    }
}
