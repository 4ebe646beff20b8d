use super::player::unknown_session;
use super::GameEngine;
use crate::error::GameResult;
use crate::types::*;
use std::time::Duration;
use tokio::time::Instant;

impl GameEngine {
    /// Build what `session_key` should see right now.
    ///
    /// Like every other entry point this starts a new round when none is
    /// active and enough players have joined, so calling it can advance the
    /// game.
    pub fn view_for(&mut self, session_key: &str) -> GameResult<PlayerView> {
        if !self.players.contains(session_key) {
            return Err(unknown_session(session_key));
        }

        self.get_or_create_active_round();
        let player = self
            .players
            .get(session_key)
            .ok_or_else(|| unknown_session(session_key))?;

        let Some(round) = self.active_round() else {
            return Ok(PlayerView {
                name: player.name.clone(),
                seq: player.seq,
                status: PlayerStatus::Lobby,
                hand: player.hand.clone(),
                round: None,
            });
        };

        let role = if round.judge == player.seq {
            Role::Judge
        } else {
            Role::Player
        };
        let own_submission = round.submission_by(player.seq).map(|s| s.card.clone());

        let status = match (round.phase, role) {
            (RoundPhase::JudgeSelecting, _) => PlayerStatus::JudgeSelecting,
            (RoundPhase::ViewingWinner, _) => PlayerStatus::ViewingWinner,
            (RoundPhase::PlayersSelecting, Role::Judge) => PlayerStatus::JudgeWaiting,
            (RoundPhase::PlayersSelecting, Role::Player) if own_submission.is_some() => {
                PlayerStatus::PlayerWaiting
            }
            (RoundPhase::PlayersSelecting, Role::Player) => PlayerStatus::PlayerSelecting,
        };

        let time_left = match round.phase {
            RoundPhase::PlayersSelecting => {
                let elapsed = Instant::now().saturating_duration_since(round.started);
                Duration::from_secs(self.config.round_seconds)
                    .saturating_sub(elapsed)
                    .as_secs()
            }
            RoundPhase::JudgeSelecting | RoundPhase::ViewingWinner => 0,
        };

        Ok(PlayerView {
            name: player.name.clone(),
            seq: player.seq,
            status,
            hand: player.hand.clone(),
            round: Some(RoundView {
                round_no: round.number,
                phase: round.phase,
                role,
                judge: round.judge_name.clone(),
                prompt: round.prompt.clone(),
                played_cards: round.submissions.iter().map(|s| s.card.clone()).collect(),
                own_submission,
                winning_card: round.winning_card.clone(),
                winner: round.winner.clone(),
                time_left,
            }),
        })
    }
}
