//! Progress UI (spinner) while a resolution or artifact is pending.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use aetherload_core::SessionSnapshot;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

/// Spinner handle: set `stop` and await `handle` to clear the line.
pub(crate) struct Spinner {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl Spinner {
    /// Signals the spinner to stop and waits for it to clear.
    pub(crate) async fn finish(self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle {
            let _ = handle.await;
        }
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.handle.is_some() && !self.stop.load(Ordering::SeqCst)
    }
}

/// Spawns a spinner that follows session snapshots while they are loading.
///
/// When `use_spinner` is false, returns a spinner that is already stopped.
pub(crate) fn spawn_analyzing_spinner(
    use_spinner: bool,
    url: &str,
    snapshots: watch::Receiver<SessionSnapshot>,
) -> Spinner {
    let target = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(ToString::to_string))
        .unwrap_or_else(|| "link".to_string());
    spawn(use_spinner, move |stop| {
        spinner_loop(format!("Analyzing {target}..."), stop, Some(snapshots))
    })
}

/// Spawns a spinner for artifact generation.
pub(crate) fn spawn_generating_spinner(use_spinner: bool, quality: &str) -> Spinner {
    let message = format!("Preparing {quality}...");
    spawn(use_spinner, move |stop| spinner_loop(message, stop, None))
}

fn spawn<F, Fut>(use_spinner: bool, body: F) -> Spinner
where
    F: FnOnce(Arc<AtomicBool>) -> Fut,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    if !use_spinner {
        return Spinner {
            handle: None,
            stop: Arc::new(AtomicBool::new(true)),
        };
    }
    let stop = Arc::new(AtomicBool::new(false));
    let handle = tokio::spawn(body(Arc::clone(&stop)));
    Spinner {
        handle: Some(handle),
        stop,
    }
}

async fn spinner_loop(
    message: String,
    stop: Arc<AtomicBool>,
    snapshots: Option<watch::Receiver<SessionSnapshot>>,
) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));

    while !stop.load(Ordering::SeqCst) {
        if let Some(receiver) = snapshots.as_ref()
            && !receiver.borrow().is_loading()
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(120)).await;
    }

    spinner.finish_and_clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use aetherload_core::Status;

    #[tokio::test]
    async fn test_disabled_spinner_is_already_stopped() {
        let (_tx, rx) = watch::channel(SessionSnapshot::default());
        let spinner = spawn_analyzing_spinner(false, "https://youtu.be/abc123", rx);
        assert!(!spinner.is_running());
        spinner.finish().await;
    }

    #[tokio::test]
    async fn test_enabled_spinner_stops_on_finish() {
        let spinner = spawn_generating_spinner(true, "1080p");
        assert!(spinner.is_running());
        spinner.finish().await;
    }

    #[tokio::test]
    async fn test_analyzing_spinner_ends_when_snapshot_settles() {
        let (tx, rx) = watch::channel(SessionSnapshot {
            status: Status::Analyzing,
            ..SessionSnapshot::default()
        });
        let spinner = spawn_analyzing_spinner(true, "https://youtu.be/abc123", rx);
        tx.send_replace(SessionSnapshot {
            status: Status::Success,
            ..SessionSnapshot::default()
        });
        let Spinner { handle, .. } = spinner;
        handle.expect("spinner enabled").await.expect("spinner task");
    }
}
