//! Scripted HTTP server for driving the client against canned responses.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use clusterviz_app::SimulationClient;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Clone, Default)]
struct Script {
    responses: Arc<Mutex<VecDeque<(u16, String)>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

async fn respond(State(script): State<Script>, method: Method, uri: Uri) -> (StatusCode, String) {
    script
        .requests
        .lock()
        .expect("request log")
        .push(format!("{method} {uri}"));
    let next = script.responses.lock().expect("responses").pop_front();
    match next {
        Some((status, body)) => (
            StatusCode::from_u16(status).expect("scripted status code"),
            body,
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "no scripted response left".to_string(),
        ),
    }
}

pub struct MockServer {
    pub base_url: String,
    script: Script,
    task: JoinHandle<()>,
}

impl MockServer {
    /// Answer requests with `responses` in order, whatever the route.
    pub async fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        let script = Script {
            responses: Arc::new(Mutex::new(responses.into())),
            ..Script::default()
        };
        let app = Router::new().fallback(respond).with_state(script.clone());
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            script,
            task,
        }
    }

    /// Method and URI of each request seen so far, e.g. `GET /data`.
    pub fn requests(&self) -> Vec<String> {
        self.script.requests.lock().expect("request log").clone()
    }

    pub fn client(&self) -> SimulationClient {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("http client");
        SimulationClient::with_http(http, &self.base_url).expect("mock base url")
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn ok(body: &str) -> (u16, String) {
    (200, body.to_string())
}

pub const KMEANS_SNAPSHOT: &str = r#"{
    "points": [{"x": 0, "y": 0}, {"x": 2, "y": 1}, {"x": 20, "y": 20}],
    "clusters": [[0, 1], [2]],
    "debug": {"type": "k_means", "means": [{"x": 1, "y": 0.5}, {"x": 20, "y": 20}]}
}"#;

pub const AP_SNAPSHOT: &str = r#"{
    "points": [{"x": 0, "y": 0}, {"x": 10, "y": 0}, {"x": 20, "y": 0}],
    "clusters": [[0, 1, 2]],
    "debug": {
        "type": "ap",
        "availability": [0, 1, 2, 3, 4, 5, 6, 7, 8],
        "responsibility": [-4, 8, 2, -4, 8, 2, -4, 8, 2]
    }
}"#;
