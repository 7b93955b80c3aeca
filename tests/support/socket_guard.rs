//! Skips wiremock tests where no loopback socket can be bound.
//!
//! Set `SHOVEL_REQUIRE_SOCKET_TESTS=1` to turn the skip into a failure.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "SHOVEL_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_ENV)
        .is_ok_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

#[track_caller]
fn loopback_unavailable() -> bool {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return false;
    }

    let caller = Location::caller();
    let message = format!(
        "[socket-bound-test] no loopback socket for {}:{}",
        caller.file(),
        caller.line()
    );
    assert!(!sockets_required(), "{message} ({REQUIRE_ENV} is set)");
    eprintln!("{message}; skipping");
    true
}

/// Starts a mock site, or returns `None` when sockets are unavailable.
#[track_caller]
pub fn mock_site_or_skip() -> impl std::future::Future<Output = Option<MockServer>> {
    let skip = loopback_unavailable();
    async move {
        if skip {
            None
        } else {
            Some(MockServer::start().await)
        }
    }
}

/// Binds a raw loopback listener, or returns `None` when sockets are unavailable.
#[track_caller]
pub fn loopback_listener_or_skip() -> impl std::future::Future<Output = Option<tokio::net::TcpListener>>
{
    let skip = loopback_unavailable();
    async move {
        if skip {
            return None;
        }
        tokio::net::TcpListener::bind("127.0.0.1:0").await.ok()
    }
}
