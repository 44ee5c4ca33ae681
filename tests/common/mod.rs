#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;

pub const SCENARIO_BODY: &str =
    r#"{"temp":21.5,"humid":40.2,"co2":612,"voc":110,"pm25":8,"score":87}"#;

#[derive(Clone)]
struct DeviceState {
    response: Arc<Mutex<(StatusCode, String)>>,
    hits: Arc<AtomicUsize>,
}

/// An in-process stand-in for an Awair device's local API.
pub struct FakeDevice {
    pub address: String,
    state: DeviceState,
}

impl FakeDevice {
    pub async fn start(body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("fake device should bind");
        let addr = listener.local_addr().expect("fake device should have an address");

        let state = DeviceState {
            response: Arc::new(Mutex::new((StatusCode::OK, body.to_string()))),
            hits: Arc::new(AtomicUsize::new(0)),
        };

        let app = Router::new()
            .route("/air-data/latest", get(latest))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            address: format!("http://{addr}/air-data/latest"),
            state,
        }
    }

    pub fn respond_with(&self, status: StatusCode, body: &str) {
        *self.state.response.lock().unwrap() = (status, body.to_string());
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub async fn wait_for_hits(&self, expected: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.hits() < expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("fake device should be polled in time");
    }
}

async fn latest(State(state): State<DeviceState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let (status, body) = state.response.lock().unwrap().clone();

    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// An address nothing listens on, so connecting is refused.
pub async fn unreachable_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("probe listener should bind");
    let addr = listener.local_addr().expect("probe listener should have an address");
    drop(listener);

    format!("http://{addr}/air-data/latest")
}

/// Accepts connections but never answers.
pub async fn hanging_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("hanging listener should bind");
    let addr: SocketAddr = listener.local_addr().expect("hanging listener should have an address");

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{addr}/air-data/latest")
}
