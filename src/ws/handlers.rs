//! WebSocket message dispatch
//!
//! Maps each client intent onto the matching party operation and turns the
//! result into a reply for the sender. Broadcast updates for the other
//! players go out through the party's event channel instead.

use crate::error::GameError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::Party;
use crate::types::Outcome;

fn error_message(e: GameError) -> ServerMessage {
    ServerMessage::Error {
        code: e.code().to_string(),
        msg: e.to_string(),
    }
}

fn ack(result: Result<Outcome, GameError>) -> ServerMessage {
    match result {
        Ok(outcome) => ServerMessage::Ack { msg: outcome.msg },
        Err(e) => error_message(e),
    }
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    session_key: &str,
    party: &Party,
) -> Option<ServerMessage> {
    let response = match msg {
        ClientMessage::Join { name } => match party.join(&name, session_key).await {
            Ok(player) => ServerMessage::Ack {
                msg: format!("{} joined party {}", player.name, party.code()),
            },
            Err(e) => error_message(e),
        },

        ClientMessage::PlayCard { card_id } => ack(party.submit_card(session_key, card_id).await),

        ClientMessage::JudgePick { card_id } => ack(party.judge_pick(session_key, card_id).await),

        ClientMessage::EndRound => ack(party.end_round().await),

        ClientMessage::ReorderHand { from, to } => {
            ack(party.reorder_hand(session_key, from, to).await)
        }

        ClientMessage::RequestState => match party.view_for(session_key).await {
            Ok(view) => ServerMessage::State { view },
            Err(e) => error_message(e),
        },

        ClientMessage::Scores => ServerMessage::Scores {
            players: party.scoreboard().await,
        },
    };

    if let ServerMessage::Error { code, msg } = &response {
        tracing::debug!("Rejected message in {}: {} ({})", party.code(), msg, code);
    }
    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::BuiltinCards;
    use crate::engine::GameEngine;
    use crate::types::{GameConfig, PlayerStatus};

    fn party() -> Party {
        let engine =
            GameEngine::with_seed("ABCDE", GameConfig::default(), &BuiltinCards, 3).unwrap();
        Party::new(engine)
    }

    async fn join(party: &Party, name: &str, session: &str) -> ServerMessage {
        handle_message(
            ClientMessage::Join {
                name: name.to_string(),
            },
            session,
            party,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_join_acknowledged() {
        let party = party();
        match join(&party, "Yusuf", "s0").await {
            ServerMessage::Ack { msg } => assert_eq!(msg, "Yusuf joined party ABCDE"),
            other => panic!("Expected Ack, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_join_is_conflict() {
        let party = party();
        join(&party, "Yusuf", "s0").await;

        match join(&party, "Yusuf", "s0").await {
            ServerMessage::Error { code, .. } => assert_eq!(code, "CONFLICT"),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_request_state_in_lobby() {
        let party = party();
        join(&party, "Yusuf", "s0").await;

        let response = handle_message(ClientMessage::RequestState, "s0", &party).await;
        match response {
            Some(ServerMessage::State { view }) => {
                assert_eq!(view.status, PlayerStatus::Lobby);
                assert_eq!(view.hand.len(), 10);
            }
            other => panic!("Expected State, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_session_gets_error() {
        let party = party();

        let response = handle_message(ClientMessage::PlayCard { card_id: 1001 }, "ghost", &party)
            .await
            .unwrap();
        match response {
            ServerMessage::Error { code, msg } => {
                assert_eq!(code, "NOT_FOUND");
                assert_eq!(msg, "You are not a player in this game");
            }
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_play_card_before_round() {
        let party = party();
        join(&party, "Yusuf", "s0").await;
        let card = party.view_for("s0").await.unwrap().hand[0].id;

        let response = handle_message(ClientMessage::PlayCard { card_id: card }, "s0", &party)
            .await
            .unwrap();
        match response {
            ServerMessage::Error { code, .. } => assert_eq!(code, "PRECONDITION_FAILED"),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reorder_hand() {
        let party = party();
        join(&party, "Yusuf", "s0").await;

        let response = handle_message(ClientMessage::ReorderHand { from: 0, to: 4 }, "s0", &party)
            .await
            .unwrap();
        assert!(matches!(response, ServerMessage::Ack { .. }));

        let response =
            handle_message(ClientMessage::ReorderHand { from: 0, to: 40 }, "s0", &party)
                .await
                .unwrap();
        match response {
            ServerMessage::Error { code, .. } => assert_eq!(code, "VALIDATION_FAILED"),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_end_round_without_rounds() {
        let party = party();
        let response = handle_message(ClientMessage::EndRound, "s0", &party)
            .await
            .unwrap();
        match response {
            ServerMessage::Error { code, .. } => assert_eq!(code, "NOT_FOUND"),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_scores() {
        let party = party();
        join(&party, "Yusuf", "s0").await;
        join(&party, "Salman", "s1").await;

        match handle_message(ClientMessage::Scores, "s0", &party).await {
            Some(ServerMessage::Scores { players }) => {
                assert_eq!(players.len(), 2);
                assert_eq!(players[0].name, "Yusuf");
            }
            other => panic!("Expected Scores, got {:?}", other),
        }
    }
}
