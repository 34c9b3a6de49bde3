//! Operator-facing scenarios, including blacklist hot reload.

use std::sync::Arc;

use tower::ServiceExt;

use trusted_headers::config::loader::parse_config;
use trusted_headers::config::watcher::apply_reload;
use trusted_headers::gate::{AllowWhen, HostBlacklist, RequestGate, SharedBlacklist};
use trusted_headers::http::build_router;
use trusted_headers::net::{ClientAuth, ConnectionContext};

mod common;

use common::{all_intact, all_stripped, echo, router, spoofed_request, tls_connection};

#[tokio::test]
async fn never_without_blacklist_strips_forwarded_for() {
    let echoed = echo(router(AllowWhen::Never, &[]), spoofed_request("netflix.com", None)).await;
    assert!(echoed["headers"].get("x-forwarded-for").is_none());
}

#[tokio::test]
async fn always_with_empty_blacklist_passes_through() {
    let echoed = echo(
        router(AllowWhen::Always, &[]),
        spoofed_request("netflix.com", Some(ConnectionContext::plain())),
    )
    .await;
    assert!(all_intact(&echoed));
}

#[tokio::test]
async fn mutual_auth_required_but_blacklisted_strips() {
    let echoed = echo(
        router(AllowWhen::MutualSslAuth, &["netflix.com"]),
        spoofed_request("netflix.com", Some(tls_connection(ClientAuth::Require))),
    )
    .await;
    assert!(all_stripped(&echoed));
}

#[tokio::test]
async fn mutual_auth_optional_strips() {
    let echoed = echo(
        router(AllowWhen::MutualSslAuth, &[]),
        spoofed_request("netflix.com", Some(tls_connection(ClientAuth::Optional))),
    )
    .await;
    assert!(all_stripped(&echoed));
}

#[tokio::test]
async fn reloaded_blacklist_applies_to_next_request() {
    let shared = SharedBlacklist::new(HostBlacklist::default());
    let app = build_router(RequestGate::new(AllowWhen::Always, shared.clone()));

    let echoed = echo(app.clone(), spoofed_request("netflix.com", None)).await;
    assert!(all_intact(&echoed));

    let reloaded = parse_config(
        r#"
        [trusted_headers]
        allow_when = "always"
        host_blacklist = ["netflix.com"]
        "#,
    )
    .unwrap();
    apply_reload(AllowWhen::Always, &shared, &reloaded);

    let echoed = echo(app, spoofed_request("netflix.com", None)).await;
    assert!(all_stripped(&echoed));
}

#[tokio::test]
async fn concurrent_connections_share_one_gate() {
    let app = build_router(RequestGate::new(
        AllowWhen::MutualSslAuth,
        Arc::new(HostBlacklist::new(["blocked.com"])),
    ));

    let mut tasks = Vec::new();
    for i in 0..32 {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            let (auth, host) = match i % 3 {
                0 => (ClientAuth::Require, "netflix.com"),
                1 => (ClientAuth::Optional, "netflix.com"),
                _ => (ClientAuth::Require, "blocked.com"),
            };
            let res = app
                .oneshot(spoofed_request(host, Some(tls_connection(auth))))
                .await
                .unwrap();
            let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
            let echoed: serde_json::Value = serde_json::from_slice(&body).unwrap();
            (i % 3, echoed["decision"].as_str().unwrap().to_string())
        }));
    }

    for task in tasks {
        let (kind, decision) = task.await.unwrap();
        let expected = match kind {
            0 => "passthrough",
            1 => "stripped_untrusted",
            _ => "stripped_blacklisted",
        };
        assert_eq!(decision, expected);
    }
}
