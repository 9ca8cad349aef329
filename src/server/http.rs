//! HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::brain::{Health, RawRequest, Stats};
use crate::server::ServerState;

/// Root response
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub status: String,
    pub message: String,
    pub version: String,
    pub stats: Stats,
}

/// Stats response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub status: String,
    pub data: Stats,
}

#[derive(Debug, Serialize)]
pub struct HealthCounts {
    pub conversations: usize,
    pub teachers: usize,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub data: HealthCounts,
}

impl From<Health> for HealthResponse {
    fn from(health: Health) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: health.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            data: HealthCounts {
                conversations: health.conversations,
                teachers: health.teachers,
            },
        }
    }
}

/// Build a [`RawRequest`] from decoded query pairs.
///
/// `reply` may repeat, also in the `reply[]` form; for the other keys the
/// first occurrence wins.
pub fn raw_request_from_pairs(pairs: Vec<(String, String)>) -> RawRequest {
    let mut raw = RawRequest::default();

    for (key, value) in pairs {
        let slot = match key.as_str() {
            "reply" | "reply[]" => {
                raw.reply.push(value);
                continue;
            }
            "text" => &mut raw.text,
            "senderID" => &mut raw.sender_id,
            "remove" => &mut raw.remove,
            "index" => &mut raw.index,
            "list" => &mut raw.list,
            "edit" => &mut raw.edit,
            "replace" => &mut raw.replace,
            "teach" => &mut raw.teach,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    raw
}

/// `GET /baby`: teach, edit, remove, list and lookup in one endpoint
pub async fn baby_handler(
    State(state): State<ServerState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let request = raw_request_from_pairs(pairs).into_request();
    debug!("Dispatching {:?}", request);

    match state.brain.handle(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": e.to_string() })),
        )
            .into_response(),
    }
}

/// `GET /stats`
pub async fn stats_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Json(StatsResponse {
        status: "success".to_string(),
        data: state.brain.stats(),
    })
}

/// `GET /health`
pub async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthResponse::from(state.brain.health()))
}

/// `GET /`
pub async fn info_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let info = state.brain.info();
    Json(InfoResponse {
        status: "OK".to_string(),
        message: "Baby API is running!".to_string(),
        version: info.version.to_string(),
        stats: info.stats,
    })
}
