//! Process-wide online/offline signal.
//!
//! [`Connectivity`] is a cloneable handle over a `tokio::sync::watch`
//! channel. The session only reads it (and subscribes to changes); whoever
//! owns the probe flips it with [`Connectivity::set_online`].

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use url::Url;

/// Shared online/offline flag with change notifications.
#[derive(Debug, Clone)]
pub struct Connectivity {
    sender: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    /// Creates a signal with the given initial state.
    #[must_use]
    pub fn new(online: bool) -> Self {
        let (sender, _receiver) = watch::channel(online);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Creates a signal that starts online.
    #[must_use]
    pub fn online() -> Self {
        Self::new(true)
    }

    /// Returns the current state.
    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }

    /// Updates the state; subscribers are notified only on an actual change.
    pub fn set_online(&self, online: bool) {
        let changed = self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            info!(online, "Connectivity changed");
        }
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::online()
    }
}

/// Extracts the host and port to probe from a service base URL.
#[must_use]
pub fn probe_target(base_url: &str) -> Option<(String, u16)> {
    let url = Url::parse(base_url).ok()?;
    let host = url.host_str()?.to_string();
    let port = url.port_or_known_default()?;
    Some((host, port))
}

/// Returns true when a TCP connection to `host:port` succeeds within `timeout`.
pub async fn probe_online(host: &str, port: u16, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(error)) => {
            debug!(host, port, error = %error, "Connectivity probe failed");
            false
        }
        Err(_) => {
            debug!(host, port, "Connectivity probe timed out");
            false
        }
    }
}

/// Re-probes `host:port` every `interval` and publishes the result.
///
/// Runs until the returned handle is aborted.
pub fn spawn_monitor(
    connectivity: Connectivity,
    host: String,
    port: u16,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let online = probe_online(&host, port, interval).await;
            connectivity.set_online(online);
            tokio::time::sleep(interval).await;
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reports_initial_state() {
        assert!(Connectivity::online().is_online());
        assert!(!Connectivity::new(false).is_online());
    }

    #[tokio::test]
    async fn test_set_online_notifies_subscribers_on_change() {
        let connectivity = Connectivity::online();
        let mut receiver = connectivity.subscribe();

        connectivity.set_online(false);
        receiver.changed().await.unwrap();
        assert!(!*receiver.borrow_and_update());
        assert!(!connectivity.is_online());
    }

    #[tokio::test]
    async fn test_set_online_same_value_does_not_notify() {
        let connectivity = Connectivity::online();
        let receiver = connectivity.subscribe();
        connectivity.set_online(true);
        assert!(!receiver.has_changed().unwrap());
    }

    #[test]
    fn test_clones_share_state() {
        let owner = Connectivity::online();
        let reader = owner.clone();
        owner.set_online(false);
        assert!(!reader.is_online());
    }

    #[test]
    fn test_probe_target_uses_default_ports() {
        assert_eq!(
            probe_target("https://generativelanguage.googleapis.com"),
            Some(("generativelanguage.googleapis.com".to_string(), 443))
        );
        assert_eq!(
            probe_target("http://127.0.0.1:8080/base"),
            Some(("127.0.0.1".to_string(), 8080))
        );
        assert_eq!(probe_target("not a url"), None);
    }

    #[tokio::test]
    async fn test_probe_online_against_local_listener() {
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            return;
        };
        let port = listener.local_addr().unwrap().port();
        assert!(probe_online("127.0.0.1", port, Duration::from_secs(2)).await);

        drop(listener);
        assert!(!probe_online("127.0.0.1", port, Duration::from_secs(2)).await);
    }
}
