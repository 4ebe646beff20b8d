use super::GameEngine;
use crate::error::{GameError, GameResult};
use crate::types::*;
use std::time::Duration;
use tokio::time::Instant;

impl GameEngine {
    /// Most recent round, active or not
    pub fn latest_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    /// The latest round if it has not been ended
    pub fn active_round(&self) -> Option<&Round> {
        self.rounds.last().filter(|r| r.active)
    }

    /// Full round history, oldest first
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Return the active round, starting a new one if the latest has ended.
    ///
    /// Returns `None` without touching any state while fewer than the
    /// configured minimum of players have joined.
    pub fn get_or_create_active_round(&mut self) -> Option<&Round> {
        if self.active_round().is_none() && !self.start_round() {
            return None;
        }
        self.rounds.last()
    }

    fn start_round(&mut self) -> bool {
        let player_count = self.players.len();
        if player_count < self.config.min_players {
            tracing::debug!(
                "Cannot start a round in {}: {} of {} players",
                self.party_code,
                player_count,
                self.config.min_players
            );
            return false;
        }
        if self.prompt_deck.is_empty() {
            tracing::warn!("Cannot start a round in {}: no prompt cards left", self.party_code);
            return false;
        }

        let number = self.rounds.len() as RoundNo + 1;
        let judge = (number as usize - 1) % player_count;
        let judge_name = match self.players.by_seq(judge) {
            Some(p) => p.name.clone(),
            None => {
                tracing::error!("No player with sequence index {}", judge);
                return false;
            }
        };

        let started = Instant::now();
        let Some(deadline) = started.checked_add(Duration::from_secs(self.config.round_seconds))
        else {
            tracing::error!(
                "Cannot start a round in {}: round length of {}s is out of range",
                self.party_code,
                self.config.round_seconds
            );
            return false;
        };

        self.prompt_deck.shuffle(&mut self.rng);
        self.response_deck.shuffle(&mut self.rng);
        let prompt = match self.prompt_deck.draw_one() {
            Ok(card) => card,
            Err(e) => {
                tracing::warn!("Cannot start a round in {}: {}", self.party_code, e);
                return false;
            }
        };

        self.timer.arm(number, deadline);

        tracing::info!(
            "Starting round {} in {}, judge is {}",
            number,
            self.party_code,
            judge_name
        );
        self.rounds.push(Round {
            number,
            active: true,
            phase: RoundPhase::PlayersSelecting,
            started_at: chrono::Utc::now(),
            ended_at: None,
            started,
            judge,
            judge_name: judge_name.clone(),
            prompt,
            submissions: Vec::new(),
            winning_card: None,
            winner: None,
        });

        self.publish(GameEvent::RoundStarted {
            round_no: number,
            judge: judge_name,
        });
        true
    }

    /// Called when the round timer for `round_no` fires.
    ///
    /// Moves the round to `judge-selecting` if it is still collecting cards.
    /// Stale or cancelled timers are ignored; returns whether the phase changed.
    pub fn expire_round_timer(&mut self, round_no: RoundNo) -> bool {
        if !self.timer.expire(round_no) {
            tracing::debug!("Ignoring stale timer for round {}", round_no);
            return false;
        }

        let round = match self.rounds.last_mut() {
            Some(r) if r.number == round_no && r.active => r,
            _ => return false,
        };
        if round.phase != RoundPhase::PlayersSelecting {
            return false;
        }

        round.phase = RoundPhase::JudgeSelecting;
        tracing::info!(
            "Round {} in {} timed out with {} cards played",
            round_no,
            self.party_code,
            round.submissions.len()
        );

        self.publish(GameEvent::PhaseChanged {
            round_no,
            phase: RoundPhase::JudgeSelecting,
            reason: PhaseChangeReason::Timeout,
            msg: "Judge-selection time!".to_string(),
        });
        true
    }

    /// End the latest round and return its cards to the decks
    pub fn end_round(&mut self) -> GameResult<Outcome> {
        let round = self.rounds.last_mut().ok_or_else(|| {
            GameError::NotFound("Cannot end round, no rounds exist for this game".to_string())
        })?;

        if !round.active {
            return Err(GameError::Precondition(format!(
                "Round {} has already ended",
                round.number
            )));
        }

        round.active = false;
        if round.ended_at.is_none() {
            round.ended_at = Some(chrono::Utc::now());
        }
        self.timer.cancel();

        let played: Vec<Card> = round
            .submissions
            .iter()
            .cloned()
            .map(Submission::into_card)
            .collect();
        let returned = played.len();
        self.response_deck.return_cards(played);
        self.prompt_deck.return_cards([round.prompt.clone()]);

        let number = round.number;
        tracing::info!(
            "Round {} in {} finished, {} response cards returned",
            number,
            self.party_code,
            returned
        );
        self.publish(GameEvent::RoundEnded { round_no: number });

        Ok(Outcome::new(format!("Round {} successfully finished", number)))
    }
}
