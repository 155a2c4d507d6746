//! Mock-service startup for hosts that may forbid loopback sockets.

use std::net::{Ipv4Addr, TcpListener};

use wiremock::MockServer;

/// Set to `1`, `true` or `yes` to fail instead of skipping.
const STRICT_ENV: &str = "AETHERLOAD_REQUIRE_SOCKET_TESTS";

fn loopback_available() -> bool {
    TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).is_ok()
}

fn strict_mode() -> bool {
    std::env::var(STRICT_ENV)
        .is_ok_and(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Starts a mock Gemini endpoint, or returns `None` when the sandbox
/// blocks loopback binds and strict mode is off.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if loopback_available() {
        return Some(MockServer::start().await);
    }

    assert!(
        !strict_mode(),
        "{STRICT_ENV} is set but 127.0.0.1 cannot be bound"
    );
    eprintln!("[mock-gemini] loopback bind refused, skipping test ({STRICT_ENV}=1 fails instead)");
    None
}
