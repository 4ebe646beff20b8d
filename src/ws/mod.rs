pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage, PROTOCOL_VERSION};
use crate::state::{AppState, Party};
use crate::types::SessionKey;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub party: Option<String>,
    pub session: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!(
        "WebSocket connection request: party={:?}, session={:?}",
        params.party,
        params.session
    );

    ws.on_upgrade(move |socket| handle_socket(socket, params, state))
}

async fn send_json(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize message: {}", e);
            true
        }
    }
}

/// Look up the party named in the query, or open a new one
async fn resolve_party(state: &AppState, code: Option<&str>) -> Result<Party, ServerMessage> {
    let result = match code {
        Some(code) => state.get_or_create_party(code).await,
        None => state.create_party().await,
    };
    result.map_err(|e| ServerMessage::Error {
        code: e.code().to_string(),
        msg: e.to_string(),
    })
}

/// Trimmed session key from the query, or a fresh one when none was given
fn session_key(requested: Option<&str>) -> SessionKey {
    requested
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| ulid::Ulid::new().to_string())
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, params: WsQuery, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let party = match resolve_party(&state, params.party.as_deref()).await {
        Ok(party) => party,
        Err(error) => {
            tracing::warn!("Refusing connection for party {:?}", params.party);
            let _ = send_json(&mut sender, &error).await;
            return;
        }
    };

    let session = session_key(params.session.as_deref());

    tracing::info!("WebSocket connected to {} as {}", party.code(), session);

    let welcome = ServerMessage::Welcome {
        protocol: PROTOCOL_VERSION.to_string(),
        party_code: party.code().to_string(),
        session: session.clone(),
        server_now: chrono::Utc::now().to_rfc3339(),
    };
    if !send_json(&mut sender, &welcome).await {
        tracing::error!("Failed to send welcome message");
        return;
    }

    // Reconnecting players get their view straight away
    if let Ok(view) = party.view_for(&session).await {
        if !send_json(&mut sender, &ServerMessage::State { view }).await {
            return;
        }
    }

    let mut events = party.subscribe();

    loop {
        tokio::select! {
            // Game events: forward, then follow up with a fresh view
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if !send_json(&mut sender, &ServerMessage::Event { event }).await {
                            break;
                        }
                        if let Ok(view) = party.view_for(&session).await {
                            if !send_json(&mut sender, &ServerMessage::State { view }).await {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Session {} lagged behind by {} events", session, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            // Handle client messages
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(response) =
                                    handlers::handle_message(client_msg, &session, &party).await
                                {
                                    if !send_json(&mut sender, &response).await {
                                        tracing::error!("Failed to send response");
                                        break;
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                let _ = send_json(&mut sender, &error).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    tracing::info!("WebSocket connection closed for {} in {}", session, party.code());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_is_trimmed() {
        assert_eq!(session_key(Some(" abc ")), "abc");
        assert_eq!(session_key(Some("abc")), "abc");
    }

    #[test]
    fn test_missing_session_key_is_generated() {
        let generated = session_key(None);
        assert_eq!(generated.len(), 26);
        assert!(generated.parse::<ulid::Ulid>().is_ok());

        let blank = session_key(Some("   "));
        assert_eq!(blank.len(), 26);
        assert_ne!(blank, generated);
    }
}
