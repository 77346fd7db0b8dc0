//! End-to-end tests against a gateway on a real socket.

use std::sync::Arc;

use reqwest::{header, StatusCode};
use serde_json::Value;

mod common;

#[tokio::test]
async fn test_full_login_flow() {
    let gateway = common::start_gateway(common::test_config()).await;
    let client = common::client();

    let res = client.get(gateway.url("/users/dashboard")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[header::LOCATION], "/login");

    let res = client.get(gateway.url("/login")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("<form"));

    let res = common::login(&client, &gateway, "user", "user123").await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[header::LOCATION], "/users/dashboard");

    let res = client.get(gateway.url("/users/dashboard")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    assert!(res.text().await.unwrap().contains("Signed in as user"));

    let res = client.post(gateway.url("/logout")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);

    let res = client.get(gateway.url("/users/dashboard")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);

    gateway.stop().await;
}

#[tokio::test]
async fn test_lockout_after_max_attempts() {
    let gateway = common::start_gateway(common::test_config()).await;
    let client = common::client();

    let res = common::login(&client, &gateway, "user", "nope").await;
    assert!(res.text().await.unwrap().contains("2 attempts remaining"));
    let res = common::login(&client, &gateway, "user", "nope").await;
    assert!(res.text().await.unwrap().contains("1 attempt remaining"));

    let res = common::login(&client, &gateway, "user", "nope").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res
        .text()
        .await
        .unwrap()
        .contains("Too many failed attempts. Please try again later."));

    // Cookie was cleared, so the next attempt starts a fresh session.
    let res = common::login(&client, &gateway, "user", "nope").await;
    assert!(res.text().await.unwrap().contains("2 attempts remaining"));

    gateway.stop().await;
}

#[tokio::test]
async fn test_admin_api_requires_admin_role() {
    let gateway = common::start_gateway(common::test_config()).await;

    let user = common::client();
    common::login(&user, &gateway, "user", "user123").await;
    let res = user.get(gateway.url("/admin/status")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let admin = common::client();
    common::login(&admin, &gateway, "admin", "admin123").await;
    let res = admin.get(gateway.url("/admin/status")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "operational");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let res = admin.get(gateway.url("/admin/sessions")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["authenticated"], 2);

    gateway.stop().await;
}

#[tokio::test]
async fn test_public_paths_need_no_session() {
    let gateway = common::start_gateway(common::test_config()).await;
    let client = common::client();

    let res = client
        .get(gateway.url("/api/public/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "UP");

    // Excluded but unrouted.
    let res = client.get(gateway.url("/public/app.css")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Looks like the public prefix but is not under it.
    let res = client.get(gateway.url("/publicity")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);

    gateway.stop().await;
}

#[tokio::test]
async fn test_concurrent_failures_on_one_session() {
    let mut config = common::test_config();
    config.login.max_attempts = 20;
    let gateway = Arc::new(common::start_gateway(config).await);
    let client = common::client();

    // Establish the session the parallel attempts will share.
    common::login(&client, &gateway, "user", "nope").await;

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let client = client.clone();
            let gateway = gateway.clone();
            tokio::spawn(async move {
                let res = common::login(&client, &gateway, "user", "nope").await;
                res.text().await.unwrap()
            })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().contains("attempts remaining"));
    }

    // 11 failures counted; the 12th leaves 8.
    let res = common::login(&client, &gateway, "user", "nope").await;
    assert!(res.text().await.unwrap().contains("8 attempts remaining"));

    if let Ok(gateway) = Arc::try_unwrap(gateway) {
        gateway.stop().await;
    }
}
