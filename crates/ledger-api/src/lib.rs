//! JSON REST API for the account ledger.
//!
//! Exposes an axum [`Router`] backed by any [`ledger_core::store::EventStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = ledger_api::router(Arc::new(store));
//! ```

pub mod accounts;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  response::Html,
  routing::{get, post, put},
};
use ledger_core::store::EventStore;

pub use error::ApiError;

const INDEX_HTML: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Ledger</title>
    <style>
      html { font-family: sans-serif; }
      body { padding: 4rem; line-height: 1.5; }
    </style>
  </head>
  <body>
    <h1>Ledger</h1>
    <p>Accounts are stored as an append-only log of events and rebuilt on every read.</p>
    <ul>
      <li><code>GET /accounts/{id}</code> returns the current state of an account.</li>
      <li><code>GET /accounts/{id}/events</code> returns its history.</li>
      <li><code>POST /accounts</code> opens an account.</li>
      <li><code>PUT /accounts/{id}/owner</code> renames the owner.</li>
      <li><code>POST /accounts/{id}/credits</code> and <code>/debits</code> move money.</li>
    </ul>
  </body>
</html>
"#;

/// `GET /`
async fn index() -> Html<&'static str> { Html(INDEX_HTML) }

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn router<S>(store: Arc<S>) -> Router<()>
where
  S: EventStore + 'static,
{
  Router::new()
    .route("/", get(index))
    .route("/accounts", post(accounts::open::<S>))
    .route("/accounts/{id}", get(accounts::get_one::<S>))
    .route("/accounts/{id}/events", get(accounts::events::<S>))
    .route("/accounts/{id}/owner", put(accounts::rename::<S>))
    .route("/accounts/{id}/credits", post(accounts::credit::<S>))
    .route("/accounts/{id}/debits", post(accounts::debit::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
  };
  use ledger_core::{
    Error, Result,
    event::{AccountId, Event},
  };
  use ledger_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    router(Arc::new(store))
  }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
  }

  async fn open(app: &Router, id: &str, owner: &str) {
    let (status, _) = send(
      app,
      "POST",
      "/accounts",
      Some(json!({ "accountId": id, "ownerName": owner })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  #[tokio::test]
  async fn index_serves_html() {
    let resp = app()
      .await
      .oneshot(Request::get("/").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"), "{content_type}");
  }

  #[tokio::test]
  async fn unknown_account_is_zero_value() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/accounts/nonexistent", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
      body,
      json!({
        "accountId": "",
        "ownerName": "",
        "openedAt": 0,
        "status": "open",
        "transactions": [],
        "balance": 0.0,
        "isOverdrawn": false,
      })
    );
  }

  #[tokio::test]
  async fn open_credit_debit_and_read() {
    let app = app().await;
    open(&app, "12060626", "Alice").await;

    let (status, credit) = send(
      &app,
      "POST",
      "/accounts/12060626/credits",
      Some(json!({ "value": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(credit["position"], 1);
    assert_eq!(credit["type"], "MoneyCredited");

    let (status, _) = send(
      &app,
      "POST",
      "/accounts/12060626/debits",
      Some(json!({ "value": 30 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, account) = send(&app, "GET", "/accounts/12060626", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["ownerName"], "Alice");
    assert_eq!(account["balance"], 70.0);
    assert_eq!(account["isOverdrawn"], false);
    assert_eq!(account["transactions"][0]["type"], "credit");
    assert_eq!(account["transactions"][1]["type"], "debit");
    assert_eq!(account["transactions"][1]["value"], 30.0);

    let (_, events) = send(&app, "GET", "/accounts/12060626/events", None).await;
    let positions: Vec<_> = events
      .as_array()
      .unwrap()
      .iter()
      .map(|e| e["position"].as_u64().unwrap())
      .collect();
    assert_eq!(positions, [0, 1, 2]);
  }

  #[tokio::test]
  async fn rename_owner() {
    let app = app().await;
    open(&app, "12060626", "Alice").await;

    let (status, body) = send(
      &app,
      "PUT",
      "/accounts/12060626/owner",
      Some(json!({ "ownerName": "Bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("updated"));

    let (_, account) = send(&app, "GET", "/accounts/12060626", None).await;
    assert_eq!(account["ownerName"], "Bob");
    assert_eq!(account["transactions"], json!([]));
  }

  #[tokio::test]
  async fn reopening_conflicts() {
    let app = app().await;
    open(&app, "12060626", "Alice").await;

    let (status, body) = send(
      &app,
      "POST",
      "/accounts",
      Some(json!({ "accountId": "12060626", "ownerName": "Mallory" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (_, account) = send(&app, "GET", "/accounts/12060626", None).await;
    assert_eq!(account["ownerName"], "Alice");
  }

  #[tokio::test]
  async fn writes_to_unknown_account_are_not_found() {
    let app = app().await;
    let (status, _) = send(
      &app,
      "PUT",
      "/accounts/nobody/owner",
      Some(json!({ "ownerName": "Bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn invalid_input_is_bad_request() {
    let app = app().await;
    open(&app, "12060626", "Alice").await;

    let (status, _) = send(
      &app,
      "POST",
      "/accounts/12060626/debits",
      Some(json!({ "value": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
      &app,
      "POST",
      "/accounts",
      Some(json!({ "accountId": "  ", "ownerName": "Alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/accounts/%20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  /// A store whose storage is always broken.
  struct BrokenStore;

  impl EventStore for BrokenStore {
    async fn load(&self, _: &AccountId) -> Result<Vec<Event>> {
      Err(Error::internal(
        "EIO reading /var/lib/ledger/12060626/0.json",
        "failed to process the data",
      ))
    }

    async fn append(&self, _: &Event) -> Result<()> {
      Err(Error::internal("disk full", "failed to write event"))
    }
  }

  #[tokio::test]
  async fn internal_errors_do_not_leak_causes() {
    let app = router(Arc::new(BrokenStore));
    let (status, body) = send(&app, "GET", "/accounts/12060626", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "failed to process the data" }));
  }
}
