use crate::broadcast::spawn_round_timer;
use crate::engine::GameEngine;
use crate::error::GameResult;
use crate::types::*;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// Handle to one running game.
///
/// Every operation locks the engine, so calls on the same party are applied
/// one at a time. After each call any round timer the engine armed is
/// backed by a sleeping task.
#[derive(Clone)]
pub struct Party {
    code: PartyCode,
    engine: Arc<Mutex<GameEngine>>,
    events: broadcast::Sender<GameEvent>,
}

impl Party {
    pub fn new(engine: GameEngine) -> Self {
        let code = engine.party_code().to_string();
        let events = engine.event_sender();
        Self {
            code,
            engine: Arc::new(Mutex::new(engine)),
            events,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Run `f` against the locked engine, then schedule any new round timer
    async fn with_engine<T>(&self, f: impl FnOnce(&mut GameEngine) -> T) -> T {
        let mut engine = self.engine.lock().await;
        let result = f(&mut *engine);
        self.schedule_round_timer(&mut *engine);
        result
    }

    fn schedule_round_timer(&self, engine: &mut GameEngine) {
        let Some((round_no, deadline)) = engine.timer().unscheduled() else {
            return;
        };
        let task = spawn_round_timer(Arc::downgrade(&self.engine), round_no, deadline);
        engine.timer_mut().attach(round_no, task);
        tracing::debug!("Scheduled timer for round {} in {}", round_no, self.code);
    }

    pub async fn join(&self, name: &str, session_key: &str) -> GameResult<Player> {
        self.with_engine(|engine| engine.join(name, session_key).cloned())
            .await
    }

    pub async fn submit_card(&self, session_key: &str, card_id: CardId) -> GameResult<Outcome> {
        self.with_engine(|engine| engine.submit_card(session_key, card_id))
            .await
    }

    pub async fn judge_pick(&self, session_key: &str, card_id: CardId) -> GameResult<Outcome> {
        self.with_engine(|engine| engine.judge_pick(session_key, card_id))
            .await
    }

    pub async fn end_round(&self) -> GameResult<Outcome> {
        self.with_engine(|engine| engine.end_round()).await
    }

    pub async fn reorder_hand(
        &self,
        session_key: &str,
        from: usize,
        to: usize,
    ) -> GameResult<Outcome> {
        self.with_engine(|engine| engine.reorder_hand(session_key, from, to))
            .await
    }

    pub async fn view_for(&self, session_key: &str) -> GameResult<PlayerView> {
        self.with_engine(|engine| engine.view_for(session_key))
            .await
    }

    /// The active round, starting one if enough players have joined
    pub async fn active_round(&self) -> Option<Round> {
        self.with_engine(|engine| engine.get_or_create_active_round().cloned())
            .await
    }

    pub async fn rounds(&self) -> Vec<Round> {
        self.engine.lock().await.rounds().to_vec()
    }

    pub async fn scoreboard(&self) -> Vec<ScoreEntry> {
        self.engine.lock().await.scoreboard()
    }

    pub async fn player_count(&self) -> usize {
        self.engine.lock().await.player_count()
    }
}
