//! Shared helpers for runtime integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use url::Url;

/// Serve `app` on an ephemeral localhost port for the rest of the test.
pub async fn serve(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });
    Url::parse(&format!("http://{addr}")).expect("valid url")
}

/// App answering 200 on `/`.
pub fn ok_root() -> Router {
    Router::new().route("/", get(|| async { "ok" }))
}

/// App whose `/` fails with 503 for the first `failures` requests.
pub fn flaky_root(failures: usize) -> (Router, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/",
        get(move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < failures {
                    StatusCode::SERVICE_UNAVAILABLE
                } else {
                    StatusCode::OK
                }
            }
        }),
    );
    (app, hits)
}

/// Port that refuses connections.
pub fn unreachable() -> Url {
    Url::parse("http://127.0.0.1:9").expect("valid url")
}
