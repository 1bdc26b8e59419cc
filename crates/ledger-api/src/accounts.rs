//! Handlers for `/accounts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/accounts/:id` | Projected account; zero-value account if unknown |
//! | `GET`  | `/accounts/:id/events` | Raw history in position order |
//! | `POST` | `/accounts` | Body: `{"accountId":"...","ownerName":"..."}`; 201 |
//! | `PUT`  | `/accounts/:id/owner` | Body: `{"ownerName":"..."}` |
//! | `POST` | `/accounts/:id/credits` | Body: `{"value":100}`; 201 |
//! | `POST` | `/accounts/:id/debits` | Body: `{"value":30}`; 201 |
//!
//! Writes do not retry. A `409` means another writer took the position
//! first; the client may simply send the request again.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use ledger_core::{
  account::{Account, project},
  event::{AccountId, Event, EventKind},
  position::next_position,
  store::EventStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

/// Append `kind` to an existing account at the next free position.
async fn record<S: EventStore>(
  store: &S,
  id: &str,
  kind: EventKind,
) -> Result<Event, ApiError> {
  let account_id = AccountId::parse(id)?;
  let events = store.load(&account_id).await?;
  if events.is_empty() {
    return Err(ApiError::NotFound(format!("account {account_id} not found")));
  }

  let event = Event::new(account_id, next_position(&events)?, kind);
  store.append_event(&event).await?;
  tracing::info!(
    account_id = %event.account_id,
    position = event.position,
    kind = event.kind.name(),
    "recorded event"
  );
  Ok(event)
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /accounts/:id`
pub async fn get_one<S: EventStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Account>, ApiError> {
  let events = store.load_events(&id).await?;
  Ok(Json(project(&id, &events)?))
}

/// `GET /accounts/:id/events`
pub async fn events<S: EventStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Event>>, ApiError> {
  Ok(Json(store.load_events(&id).await?))
}

// ─── Open ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenBody {
  pub account_id: String,
  pub owner_name: String,
}

/// `POST /accounts`
pub async fn open<S: EventStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<OpenBody>,
) -> Result<impl IntoResponse, ApiError> {
  let account_id = AccountId::parse(body.account_id)?;
  let event = Event::new(
    account_id,
    0,
    EventKind::AccountOpened { owner_name: body.owner_name },
  );
  store.append_event(&event).await?;
  tracing::info!(account_id = %event.account_id, "opened account");
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Rename ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameBody {
  pub owner_name: String,
}

/// `PUT /accounts/:id/owner`
pub async fn rename<S: EventStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Json(body): Json<RenameBody>,
) -> Result<impl IntoResponse, ApiError> {
  record(
    store.as_ref(),
    &id,
    EventKind::UpdateAccount { owner_name: body.owner_name },
  )
  .await?;
  Ok(Json(json!({
    "message": "Successfully updated the name of the account holder",
  })))
}

// ─── Money movement ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AmountBody {
  pub value: f64,
}

/// `POST /accounts/:id/credits`
pub async fn credit<S: EventStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Json(body): Json<AmountBody>,
) -> Result<impl IntoResponse, ApiError> {
  let event = record(
    store.as_ref(),
    &id,
    EventKind::MoneyCredited { value: body.value },
  )
  .await?;
  Ok((StatusCode::CREATED, Json(event)))
}

/// `POST /accounts/:id/debits`
pub async fn debit<S: EventStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Json(body): Json<AmountBody>,
) -> Result<impl IntoResponse, ApiError> {
  let event = record(
    store.as_ref(),
    &id,
    EventKind::MoneyDebited { value: body.value },
  )
  .await?;
  Ok((StatusCode::CREATED, Json(event)))
}
