//! Presentation state machine.
//!
//! [`Session`] is the pure core: `Idle -> Analyzing -> (Success | Error)`,
//! with `reset` returning to `Idle` from anywhere. Every accepted submission
//! bumps a generation counter and hands out a [`Ticket`]; a completion whose
//! ticket no longer matches the current generation is discarded.
//!
//! [`SessionController`] drives the core asynchronously: it spawns one
//! resolution task per accepted submission, publishes snapshots on a watch
//! channel for the rendering side, and honors the connectivity overlay.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::connectivity::Connectivity;
use crate::media::MediaRecord;
use crate::pipeline::resolve_url;
use crate::resolver::{ResolveError, Resolver};

/// Lifecycle state of the interactive surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Analyzing,
    Success,
    Error,
}

/// Proof of one accepted submission, checked again at completion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    url: String,
}

impl Ticket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The trimmed URL that was submitted.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// What the rendering side needs to redraw.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub status: Status,
    pub generation: u64,
    pub record: Option<Arc<MediaRecord>>,
    pub error: Option<String>,
}

impl SessionSnapshot {
    /// True while a resolution is outstanding (drives the loading flag).
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == Status::Analyzing
    }
}

/// Pure state machine; holds no I/O.
#[derive(Debug, Default)]
pub struct Session {
    status: Status,
    generation: u64,
    record: Option<Arc<MediaRecord>>,
    error: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn record(&self) -> Option<&Arc<MediaRecord>> {
        self.record.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starts a new resolution attempt.
    ///
    /// Empty or whitespace-only input is a no-op and returns `None`.
    /// Otherwise moves to `Analyzing` from any state, discards the previous
    /// record and error, and supersedes any outstanding ticket.
    pub fn submit(&mut self, raw_url: &str) -> Option<Ticket> {
        let url = raw_url.trim();
        if url.is_empty() {
            return None;
        }

        self.generation += 1;
        self.status = Status::Analyzing;
        self.record = None;
        self.error = None;

        Some(Ticket {
            generation: self.generation,
            url: url.to_string(),
        })
    }

    /// Applies the outcome of a resolution.
    ///
    /// Returns false (and changes nothing) when the ticket has been
    /// superseded by a newer submission or a reset.
    pub fn complete(
        &mut self,
        ticket: &Ticket,
        outcome: Result<MediaRecord, ResolveError>,
    ) -> bool {
        if ticket.generation != self.generation || self.status != Status::Analyzing {
            return false;
        }

        match outcome {
            Ok(record) => {
                self.status = Status::Success;
                self.record = Some(Arc::new(record));
                self.error = None;
            }
            Err(error) => {
                self.status = Status::Error;
                self.record = None;
                self.error = Some(error.user_message().to_string());
            }
        }
        true
    }

    /// Returns to `Idle`, clearing stored state and superseding in-flight work.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.status = Status::Idle;
        self.record = None;
        self.error = None;
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            generation: self.generation,
            record: self.record.clone(),
            error: self.error.clone(),
        }
    }
}

/// What the interactive surface shows, after the connectivity overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Reduced fallback view; the input form is suppressed.
    Offline,
    /// Normal surface for the current session state.
    Interactive(SessionSnapshot),
}

/// Asynchronous driver around [`Session`].
pub struct SessionController {
    session: Arc<Mutex<Session>>,
    resolver: Arc<dyn Resolver>,
    connectivity: Connectivity,
    snapshots: Arc<watch::Sender<SessionSnapshot>>,
}

impl SessionController {
    /// Creates a controller in the `Idle` state.
    #[must_use]
    pub fn new(resolver: Arc<dyn Resolver>, connectivity: Connectivity) -> Self {
        let (snapshots, _receiver) = watch::channel(SessionSnapshot::default());
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            resolver,
            connectivity,
            snapshots: Arc::new(snapshots),
        }
    }

    /// Subscribes to snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        lock_session(&self.session).snapshot()
    }

    /// Current view; stored state survives offline periods untouched.
    #[must_use]
    pub fn view(&self) -> View {
        if self.connectivity.is_online() {
            View::Interactive(self.snapshot())
        } else {
            View::Offline
        }
    }

    /// Submits a URL.
    ///
    /// Returns `None` without any state change when offline (the form is
    /// suppressed) or when the input is empty. Otherwise spawns the
    /// resolution and returns its handle; the handle yields whether the
    /// outcome was applied (`false` when superseded).
    pub fn submit(&self, raw_url: &str) -> Option<JoinHandle<bool>> {
        if !self.connectivity.is_online() {
            debug!("Ignoring submission while offline");
            return None;
        }

        let ticket = {
            let mut session = lock_session(&self.session);
            let ticket = session.submit(raw_url)?;
            self.snapshots.send_replace(session.snapshot());
            ticket
        };
        info!(generation = ticket.generation, "Analyzing media URL");

        let session = Arc::clone(&self.session);
        let resolver = Arc::clone(&self.resolver);
        let snapshots = Arc::clone(&self.snapshots);

        Some(tokio::spawn(async move {
            let outcome = resolve_url(resolver.as_ref(), ticket.url()).await;
            let succeeded = outcome.is_ok();

            let mut session = lock_session(&session);
            if session.complete(&ticket, outcome) {
                info!(generation = ticket.generation, succeeded, "Resolution settled");
                snapshots.send_replace(session.snapshot());
                true
            } else {
                debug!(
                    generation = ticket.generation,
                    current = session.generation(),
                    "Discarding superseded resolution"
                );
                false
            }
        }))
    }

    /// Explicit reset (cleared input or home action).
    pub fn reset(&self) {
        let mut session = lock_session(&self.session);
        session.reset();
        self.snapshots.send_replace(session.snapshot());
        debug!(generation = session.generation(), "Session reset");
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("resolver", &self.resolver.name())
            .field("online", &self.connectivity.is_online())
            .finish_non_exhaustive()
    }
}

fn lock_session(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
