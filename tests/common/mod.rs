//! In-process stand-in for the game API.
//!
//! Runs an axum router on a random local port in a background thread with
//! its own tokio runtime, so blocking client code can talk to it over real
//! HTTP from a plain `#[test]`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

pub const ONLINE: &str = "spacetraders is currently online and available to play";

#[derive(Default)]
pub struct MockState {
    /// Status checks answered with "offline" before reporting online.
    pub offline_polls: usize,
    pub status_requests: usize,
    /// username -> token
    pub accounts: HashMap<String, String>,
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockApi {
    pub base_url: String,
    pub state: Shared,
}

fn app(state: Shared) -> Router {
    Router::new()
        .route("/game/status", get(status))
        .route("/users/{username}/token", post(create_user))
        .route("/users/{username}", get(get_user))
        .route("/broken", get(|| async { "<html>502 Bad Gateway</html>" }))
        .with_state(state)
}

async fn status(State(state): State<Shared>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.status_requests += 1;
    if state.offline_polls > 0 {
        state.offline_polls -= 1;
        return Json(json!({ "status": "offline" }));
    }
    Json(json!({ "status": ONLINE }))
}

async fn create_user(
    State(state): State<Shared>,
    Path(username): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    if state.accounts.contains_key(&username) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": { "code": 42, "message": "username taken" } })),
        );
    }
    let token = format!("token-{username}");
    state.accounts.insert(username.clone(), token.clone());
    (
        StatusCode::CREATED,
        Json(json!({
            "token": token,
            "user": {
                "id": "ckmb0",
                "username": username,
                "credits": 0,
                "createdAt": "2021-03-11T00:00:00.000Z",
                "updatedAt": "2021-03-11T00:00:00.000Z"
            }
        })),
    )
}

async fn get_user(
    State(state): State<Shared>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let state = state.lock().unwrap();
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match (state.accounts.get(&username), presented) {
        (Some(token), Some(given)) if token == given => (
            StatusCode::OK,
            Json(json!({
                "user": {
                    "username": username,
                    "credits": 100000,
                    "ships": [{ "id": "ship-1", "type": "JW-MK-I" }],
                    "loans": []
                }
            })),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "code": 40101, "message": "Token invalid" } })),
        ),
    }
}

/// Start the mock API and return its base URL and shared state.
pub fn start(state: MockState) -> MockApi {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let state: Shared = Arc::new(Mutex::new(state));
    let router = app(state.clone());

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            axum::serve(listener, router).await
        })
        .unwrap();
    });

    MockApi {
        base_url: format!("http://{addr}"),
        state,
    }
}
