//! Mock BluOS player for testing
//!
//! Serves `/Status` and `/Volume?level=N` like a real player on port 11000,
//! records every requested level, clamps to its own range and can be told to
//! fail.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use url::Url;

/// How the player answers while a failure is injected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// HTTP 500
    ServerError,
    /// 200 with a body that is not BluOS XML
    Malformed,
}

#[derive(Debug, Clone)]
struct MockBluOsState {
    volume: i32,
    /// Highest level the player itself accepts
    player_max: i32,
    failure: Option<MockFailure>,
    requested_levels: Vec<i32>,
    status_requests: usize,
}

/// Mock BluOS player
pub struct MockBluOsPlayer {
    addr: SocketAddr,
    state: Arc<RwLock<MockBluOsState>>,
    handle: JoinHandle<()>,
}

impl MockBluOsPlayer {
    /// Start a mock player at volume 50 on a random port
    pub async fn start() -> Self {
        Self::start_with_volume(50).await
    }

    pub async fn start_with_volume(volume: i32) -> Self {
        let state = Arc::new(RwLock::new(MockBluOsState {
            volume,
            player_max: 100,
            failure: None,
            requested_levels: Vec::new(),
            status_requests: 0,
        }));

        let app = Router::new()
            .route("/Status", get(handle_status))
            .route("/Volume", get(handle_volume))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL as configured in the bridge (`http://127.0.0.1:PORT/`)
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).unwrap()
    }

    pub async fn volume(&self) -> i32 {
        self.state.read().await.volume
    }

    /// Change the volume behind the bridge's back (e.g. from the BluOS app)
    pub async fn set_volume(&self, volume: i32) {
        self.state.write().await.volume = volume;
    }

    /// Make the player clamp requests to `max` on its own
    pub async fn set_player_max(&self, max: i32) {
        self.state.write().await.player_max = max;
    }

    pub async fn set_failure(&self, failure: Option<MockFailure>) {
        self.state.write().await.failure = failure;
    }

    /// Every level passed to `/Volume`, in order
    pub async fn requested_levels(&self) -> Vec<i32> {
        self.state.read().await.requested_levels.clone()
    }

    pub async fn status_requests(&self) -> usize {
        self.state.read().await.status_requests
    }

    /// Stop the mock server
    pub async fn stop(self) {
        self.handle.abort();
    }
}

fn xml_response(xml: String) -> Response {
    Response::builder()
        .header(header::CONTENT_TYPE, "text/xml; charset=utf-8")
        .body(Body::from(xml))
        .unwrap()
}

fn failure_response(failure: MockFailure) -> Response {
    match failure {
        MockFailure::ServerError => Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::from("Internal Server Error"))
            .unwrap(),
        MockFailure::Malformed => Response::builder()
            .header(header::CONTENT_TYPE, "text/html")
            .body(Body::from("<html><body>busy</body></html>"))
            .unwrap(),
    }
}

/// Rough dB figure the way BluOS reports it alongside the level
fn level_to_db(level: i32) -> f64 {
    if level <= 0 {
        -80.0
    } else {
        (level as f64 - 100.0) * 0.6
    }
}

async fn handle_status(State(state): State<Arc<RwLock<MockBluOsState>>>) -> impl IntoResponse {
    let mut state = state.write().await;
    state.status_requests += 1;

    if let Some(failure) = state.failure {
        return failure_response(failure);
    }

    xml_response(format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<status etag="mock-etag-{}">
  <album>Mock Album</album>
  <artist>Mock Artist</artist>
  <db>{:.1}</db>
  <mute>0</mute>
  <name>Mock Track</name>
  <state>stream</state>
  <volume>{}</volume>
</status>"#,
        state.status_requests,
        level_to_db(state.volume),
        state.volume
    ))
}

async fn handle_volume(
    State(state): State<Arc<RwLock<MockBluOsState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let mut state = state.write().await;

    let level = match params.get("level").and_then(|l| l.parse::<i32>().ok()) {
        Some(level) => level,
        None => {
            return Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .body(Body::from("missing level"))
                .unwrap()
        }
    };
    state.requested_levels.push(level);

    if let Some(failure) = state.failure {
        return failure_response(failure);
    }

    state.volume = level.clamp(0, state.player_max);
    xml_response(format!(
        r#"<volume db="{:.1}" mute="0" offsetDb="0" etag="mock">{}</volume>"#,
        level_to_db(state.volume),
        state.volume
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_bluos_starts_and_stops() {
        let server = MockBluOsPlayer::start().await;
        assert!(server.addr.port() > 0);
        server.stop().await;
    }

    #[tokio::test]
    async fn mock_bluos_clamps_to_player_range() {
        let server = MockBluOsPlayer::start().await;
        server.set_player_max(80).await;

        let client = reqwest::Client::new();
        let body = client
            .get(format!("http://{}/Volume?level=95", server.addr))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        assert!(body.contains(">80</volume>"));
        assert_eq!(server.requested_levels().await, vec![95]);

        server.stop().await;
    }
}
