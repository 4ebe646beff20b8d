use crate::types::*;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        name: String,
    },
    PlayCard {
        card_id: CardId,
    },
    JudgePick {
        card_id: CardId,
    },
    EndRound,
    ReorderHand {
        from: usize,
        to: usize,
    },
    RequestState,
    Scores,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        party_code: PartyCode,
        /// Session key to reconnect with
        session: SessionKey,
        server_now: String,
    },
    /// An action succeeded
    Ack {
        msg: String,
    },
    State {
        view: PlayerView,
    },
    Event {
        event: GameEvent,
    },
    Scores {
        players: Vec<ScoreEntry>,
    },
    Error {
        code: String,
        msg: String,
    },
}
