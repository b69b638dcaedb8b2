//! End-to-end tests of the API client over real HTTP.
//!
//! Every test starts its own mock API on a random port and drives the
//! production `HttpTransport`, so request building, header injection and the
//! error envelope are all exercised on the wire.

mod common;

use std::sync::Arc;

use space_kraken::logging::{Logger, TracingLogger};
use space_kraken::poller::poll_until_online;
use space_kraken::{
    ApiClient, ClientError, Credential, CredentialStore, Headers, HttpMethod, HttpTransport,
    SqliteCredentialStore, Transport,
};

fn logger() -> Arc<dyn Logger> {
    Arc::new(TracingLogger)
}

fn client(base_url: &str) -> ApiClient<HttpTransport> {
    let transport = HttpTransport::new(logger()).unwrap();
    ApiClient::new(base_url, Credential::default(), transport, logger())
}

#[test]
fn status_reports_online() {
    let api = common::start(common::MockState::default());
    let status = client(&api.base_url).fetch_status().unwrap();
    assert_eq!(status.status, common::ONLINE);
    assert!(status.is_online());
}

#[test]
fn create_account_then_persist_credential() {
    let api = common::start(common::MockState::default());
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteCredentialStore::open(&dir.path().join("data.sqlite"), logger()).unwrap();
    assert_eq!(store.fetch(), Credential::default());

    let mut client = client(&api.base_url);
    assert!(!client.has_auth());

    let token = client.create_account("alice").unwrap();
    assert_eq!(token, "token-alice");

    store.upsert("alice", &token).unwrap();
    assert_eq!(store.fetch(), Credential::new("alice", "token-alice"));

    client.set_auth("alice", &token);
    let fetched = client.fetch_account().unwrap();
    assert_eq!(fetched.user.username, "alice");
    assert_eq!(fetched.user.credits, 100000);
    assert_eq!(fetched.user.ships.len(), 1);
}

#[test]
fn taken_username_is_an_api_error_and_store_is_untouched() {
    let mut state = common::MockState::default();
    state.accounts.insert("alice".into(), "existing".into());
    let api = common::start(state);

    let dir = tempfile::tempdir().unwrap();
    let store = SqliteCredentialStore::open(&dir.path().join("data.sqlite"), logger()).unwrap();

    let err = client(&api.base_url).create_account("alice").unwrap_err();
    assert_eq!(err.to_string(), "42: username taken");
    assert!(matches!(err, ClientError::Api { code: 42, .. }));
    assert_eq!(store.fetch(), Credential::default());
}

#[test]
fn wrong_token_is_rejected_by_the_api() {
    let mut state = common::MockState::default();
    state.accounts.insert("alice".into(), "right".into());
    let api = common::start(state);

    let mut client = client(&api.base_url);
    client.set_auth("alice", "wrong");
    let err = client.fetch_account().unwrap_err();
    assert_eq!(err.to_string(), "40101: Token invalid");
}

#[test]
fn transport_returns_body_regardless_of_status_code() {
    let api = common::start(common::MockState::default());
    let transport = HttpTransport::new(logger()).unwrap();

    let url = format!("{}/users/nobody", api.base_url);
    let body = transport
        .execute(HttpMethod::Get, &url, None, &Headers::new())
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["error"]["code"], 40101);
}

#[test]
fn non_json_body_is_a_decode_error() {
    let api = common::start(common::MockState::default());
    let client = client(&format!("{}/broken", api.base_url));
    // `/broken/game/status` is not routed; axum answers 404 with an empty body.
    let err = client.fetch_status().unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));

    let transport = HttpTransport::new(logger()).unwrap();
    let body = transport
        .execute(
            HttpMethod::Get,
            &format!("{}/broken", api.base_url),
            None,
            &Headers::new(),
        )
        .unwrap();
    assert!(serde_json::from_slice::<serde_json::Value>(&body).is_err());
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}")).fetch_status().unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}

#[test]
fn poller_waits_until_the_api_is_online() {
    let api = common::start(common::MockState {
        offline_polls: 2,
        ..Default::default()
    });
    let client = client(&api.base_url);

    let mut sleeps = 0;
    let attempts = poll_until_online(&client, &TracingLogger, || {}, || sleeps += 1);

    assert_eq!(attempts, 3);
    assert_eq!(sleeps, 2);
    assert_eq!(api.state.lock().unwrap().status_requests, 3);
}
