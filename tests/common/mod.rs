//! Shared utilities for integration tests.

use std::net::SocketAddr;

use reqwest::redirect::Policy;
use session_gateway::auth::Role;
use session_gateway::config::{GatewayConfig, UserConfig};
use session_gateway::http::HttpServer;
use session_gateway::lifecycle::Shutdown;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A gateway running on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server loop to exit.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

/// Default config with the two demo accounts.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.users = vec![
        UserConfig {
            username: "admin".into(),
            password: "admin123".into(),
            role: Role::Admin,
        },
        UserConfig {
            username: "user".into(),
            password: "user123".into(),
            role: Role::User,
        },
    ];
    config
}

pub async fn start_gateway(mut config: GatewayConfig) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(config);
    let handle = tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    TestGateway {
        addr,
        shutdown,
        handle,
    }
}

/// Browser-like client: keeps cookies, does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap()
}

pub async fn login(
    client: &reqwest::Client,
    gateway: &TestGateway,
    username: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(gateway.url("/login"))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .unwrap()
}
