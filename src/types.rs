use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Opaque ID types for readability
pub type CardId = u32;
pub type SessionKey = String;
pub type PartyCode = String;
pub type RoundNo = u32;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Prompt,
    Response,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub kind: CardKind,
    pub text: String,
}

impl Card {
    pub fn prompt(id: CardId, text: impl Into<String>) -> Self {
        Self {
            id,
            kind: CardKind::Prompt,
            text: text.into(),
        }
    }

    pub fn response(id: CardId, text: impl Into<String>) -> Self {
        Self {
            id,
            kind: CardKind::Response,
            text: text.into(),
        }
    }
}

/// Who played a submitted card
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CardOwner {
    pub name: String,
    pub seq: usize,
}

/// A response card on the table, tagged with the player who played it
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Submission {
    pub card: Card,
    pub owner: CardOwner,
}

impl Submission {
    /// Strip the owner tag so the card can go back into its deck
    pub fn into_card(self) -> Card {
        self.card
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RoundPhase {
    PlayersSelecting,
    JudgeSelecting,
    ViewingWinner,
}

impl RoundPhase {
    pub fn label(&self) -> &'static str {
        match self {
            RoundPhase::PlayersSelecting => "players-selecting",
            RoundPhase::JudgeSelecting => "judge-selecting",
            RoundPhase::ViewingWinner => "viewing-winner",
        }
    }
}

/// A round a player has won
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoundWin {
    pub round_no: RoundNo,
    pub response: Card,
    pub prompt: Card,
}

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    #[serde(skip)]
    pub session_key: SessionKey,
    pub name: String,
    /// Join order, drives judge rotation. Never reassigned.
    pub seq: usize,
    pub hand: Vec<Card>,
    pub rounds_won: Vec<RoundWin>,
}

impl Player {
    pub fn holds(&self, card_id: CardId) -> bool {
        self.hand.iter().any(|c| c.id == card_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Round {
    pub number: RoundNo,
    /// False once the round has been ended; independent of `phase`
    pub active: bool,
    pub phase: RoundPhase,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub started: Instant,
    /// Sequence index of the judge, fixed when the round is created
    pub judge: usize,
    pub judge_name: String,
    pub prompt: Card,
    pub submissions: Vec<Submission>,
    pub winning_card: Option<Card>,
    pub winner: Option<String>,
}

impl Round {
    pub fn submission_by(&self, seq: usize) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.owner.seq == seq)
    }

    pub fn submission_of_card(&self, card_id: CardId) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.card.id == card_id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Judge,
    Player,
}

/// What a particular player should be doing right now
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerStatus {
    /// Not enough players to start a round
    Lobby,
    PlayerSelecting,
    /// Already submitted, waiting for the others
    PlayerWaiting,
    JudgeWaiting,
    JudgeSelecting,
    ViewingWinner,
}

/// Per-player projection of the game state
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub name: String,
    pub seq: usize,
    pub status: PlayerStatus,
    pub hand: Vec<Card>,
    pub round: Option<RoundView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundView {
    pub round_no: RoundNo,
    pub phase: RoundPhase,
    pub role: Role,
    pub judge: String,
    pub prompt: Card,
    /// Submitted cards without owner tags
    pub played_cards: Vec<Card>,
    pub own_submission: Option<Card>,
    pub winning_card: Option<Card>,
    pub winner: Option<String>,
    /// Seconds left to submit; always 0 once players are done selecting
    pub time_left: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: String,
    pub seq: usize,
    pub wins: usize,
}

/// Fewest players a round can start with: a judge and two to choose between
pub const MIN_PLAYERS: usize = 3;
pub const MAX_ROUND_SECONDS: u64 = 3600;
pub const MAX_HAND_SIZE: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    pub round_seconds: u64,
    pub hand_size: usize,
    pub min_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_seconds: 60,
            hand_size: 10,
            min_players: MIN_PLAYERS,
        }
    }
}

/// Result of a successful player action
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Outcome {
    pub msg: String,
}

impl Outcome {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseChangeReason {
    /// The round timer ran out
    Timeout,
    /// Every non-judge player has played a card
    AllSubmitted,
    JudgePicked,
}

/// Events published by a game to its subscribers
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    PlayerJoined {
        name: String,
        seq: usize,
        player_count: usize,
    },
    RoundStarted {
        round_no: RoundNo,
        judge: String,
    },
    PhaseChanged {
        round_no: RoundNo,
        phase: RoundPhase,
        reason: PhaseChangeReason,
        msg: String,
    },
    RoundEnded {
        round_no: RoundNo,
    },
}
