//! Integration tests for the rakeback portal.
//!
//! Each test starts the full portal router on an ephemeral port, backed by
//! the in-memory identity and role fakes, and drives it over real HTTP with a
//! cookie-keeping client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rakeback-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::{Client, redirect};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use rakeback_portal::state::AppState;
use rakeback_portal::testing::{FakeIdentity, FakeRoles, test_config};

/// A portal instance listening on localhost.
pub struct TestPortal {
    addr: SocketAddr,
    pub identity: Arc<FakeIdentity>,
    pub roles: Arc<FakeRoles>,
    server: JoinHandle<()>,
}

impl TestPortal {
    /// Start the portal over the given fakes.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(identity: FakeIdentity, roles: FakeRoles) -> Self {
        let identity = Arc::new(identity);
        let roles = Arc::new(roles);
        let state = AppState::with_services(
            test_config("http://identity.test"),
            identity.clone(),
            roles.clone(),
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let server = tokio::spawn(async move {
            axum::serve(listener, rakeback_portal::app(state))
                .await
                .expect("Test server error");
        });

        Self {
            addr,
            identity,
            roles,
            server,
        }
    }

    /// Absolute URL for `path` on this portal.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A browser-like client: keeps cookies, does not follow redirects.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn browser() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }
}

impl Drop for TestPortal {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// `Location` header of a response, if any.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Raw `Set-Cookie` header values of a response.
#[must_use]
pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(String::from))
        .collect()
}
