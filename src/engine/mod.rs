mod deck;
mod player;
mod round;
mod submission;
mod timer;
mod view;

pub use deck::Deck;
pub use player::PlayerRegistry;
pub use timer::RoundTimer;

use crate::cards::CardSource;
use crate::error::{GameError, GameResult};
use crate::types::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use tokio::sync::broadcast;

/// Per-party game state: decks, players, round history and the round timer.
///
/// All methods are synchronous and take `&mut self`; callers serialize
/// access (see [`crate::state::Party`]).
pub struct GameEngine {
    party_code: PartyCode,
    config: GameConfig,
    prompt_deck: Deck,
    response_deck: Deck,
    players: PlayerRegistry,
    rounds: Vec<Round>,
    timer: RoundTimer,
    events: broadcast::Sender<GameEvent>,
    rng: StdRng,
}

impl GameEngine {
    /// Create a game seeded from `source`, with both decks shuffled
    pub fn new(
        party_code: impl Into<PartyCode>,
        config: GameConfig,
        source: &dyn CardSource,
    ) -> GameResult<Self> {
        Self::with_rng(party_code.into(), config, source, StdRng::from_os_rng())
    }

    /// Same as [`GameEngine::new`] with a deterministic shuffle
    pub fn with_seed(
        party_code: impl Into<PartyCode>,
        config: GameConfig,
        source: &dyn CardSource,
        seed: u64,
    ) -> GameResult<Self> {
        Self::with_rng(
            party_code.into(),
            config,
            source,
            StdRng::seed_from_u64(seed),
        )
    }

    fn with_rng(
        party_code: PartyCode,
        mut config: GameConfig,
        source: &dyn CardSource,
        mut rng: StdRng,
    ) -> GameResult<Self> {
        if config.min_players < MIN_PLAYERS {
            tracing::warn!(
                "Game {} asked for {} players minimum, using {}",
                party_code,
                config.min_players,
                MIN_PLAYERS
            );
            config.min_players = MIN_PLAYERS;
        }

        let prompts = source.prompts();
        let responses = source.responses();

        let mut seen = HashSet::new();
        if let Some(dup) = prompts
            .iter()
            .chain(responses.iter())
            .find(|c| !seen.insert(c.id))
        {
            return Err(GameError::Validation(format!(
                "Card id {} appears more than once",
                dup.id
            )));
        }

        let mut prompt_deck = Deck::new(CardKind::Prompt, prompts)?;
        let mut response_deck = Deck::new(CardKind::Response, responses)?;
        prompt_deck.shuffle(&mut rng);
        response_deck.shuffle(&mut rng);

        tracing::info!(
            "Created game {} with {} prompt and {} response cards",
            party_code,
            prompt_deck.len(),
            response_deck.len()
        );

        let (tx, _rx) = broadcast::channel(100);
        Ok(Self {
            party_code,
            config,
            prompt_deck,
            response_deck,
            players: PlayerRegistry::default(),
            rounds: Vec::new(),
            timer: RoundTimer::default(),
            events: tx,
            rng,
        })
    }

    pub fn party_code(&self) -> &str {
        &self.party_code
    }

    pub fn prompt_deck(&self) -> &Deck {
        &self.prompt_deck
    }

    pub fn response_deck(&self) -> &Deck {
        &self.response_deck
    }

    pub fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut RoundTimer {
        &mut self.timer
    }

    /// Subscribe to phase changes and other game events
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    pub fn event_sender(&self) -> broadcast::Sender<GameEvent> {
        self.events.clone()
    }

    fn publish(&self, event: GameEvent) {
        tracing::debug!("Game {} event: {:?}", self.party_code, event);
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
