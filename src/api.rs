//! HTTP API endpoints for party management.
//!
//! Used to open a party before handing its code out, and to inspect a
//! running party's scores and round history.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;
use crate::types::{Round, ScoreEntry};

#[derive(Debug, Clone, Serialize)]
pub struct PartyCreated {
    pub party_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartySummary {
    pub party_code: String,
    pub player_count: usize,
    pub players: Vec<ScoreEntry>,
}

fn not_found(code: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        format!("No party with code {}", code),
    )
        .into_response()
}

/// Open a new party.
///
/// POST /api/parties
pub async fn create_party(State(state): State<Arc<AppState>>) -> Response {
    match state.create_party().await {
        Ok(party) => (
            StatusCode::CREATED,
            Json(PartyCreated {
                party_code: party.code().to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Party creation failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Remove a party from the registry. Sockets already connected keep their
/// handle until they close.
///
/// DELETE /api/parties/{code}
pub async fn delete_party(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    match state.remove_party(&code).await {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(&code),
    }
}

/// Players of a party ranked by rounds won.
///
/// GET /api/parties/{code}/scores
pub async fn party_scores(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    let Some(party) = state.get_party(&code).await else {
        return not_found(&code);
    };

    let players = party.scoreboard().await;
    Json(PartySummary {
        party_code: party.code().to_string(),
        player_count: players.len(),
        players,
    })
    .into_response()
}

/// Round history of a party, oldest first.
///
/// GET /api/parties/{code}/rounds
pub async fn party_rounds(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    match state.get_party(&code).await {
        Some(party) => {
            let rounds: Vec<Round> = party.rounds().await;
            Json(rounds).into_response()
        }
        None => not_found(&code),
    }
}
