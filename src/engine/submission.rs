use super::player::unknown_session;
use super::GameEngine;
use crate::error::{GameError, GameResult};
use crate::types::*;

fn not_enough_players() -> GameError {
    GameError::Precondition("Waiting for more players before the round can start".to_string())
}

impl GameEngine {
    /// Play a response card from the caller's hand into the active round.
    ///
    /// Starts a new round first when none is active and enough players have
    /// joined. That round stays even if the card is then rejected.
    pub fn submit_card(&mut self, session_key: &str, card_id: CardId) -> GameResult<Outcome> {
        let player = self
            .players
            .get(session_key)
            .ok_or_else(|| unknown_session(session_key))?;
        let name = player.name.clone();
        let seq = player.seq;
        let hand_pos = player.hand.iter().position(|c| c.id == card_id);

        if self.get_or_create_active_round().is_none() {
            return Err(not_enough_players());
        }
        let player_count = self.players.len();
        let round = self.rounds.last_mut().ok_or_else(not_enough_players)?;

        match round.phase {
            RoundPhase::PlayersSelecting => {}
            RoundPhase::JudgeSelecting => {
                return Err(GameError::Precondition(
                    "Cannot play card, the judge is currently selecting".to_string(),
                ));
            }
            RoundPhase::ViewingWinner => {
                return Err(GameError::Precondition(
                    "Cannot play card, this round already has a winner".to_string(),
                ));
            }
        }
        if round.judge == seq {
            return Err(GameError::Precondition(format!(
                "{} cannot play a card this round since they are the judge",
                name
            )));
        }
        let Some(hand_pos) = hand_pos else {
            tracing::warn!(
                "{} in {} tried to play card {} they do not hold",
                name,
                self.party_code,
                card_id
            );
            return Err(GameError::Ownership(format!(
                "{} attempted to play card {} they do not own",
                name, card_id
            )));
        };
        if round.submission_by(seq).is_some() {
            return Err(GameError::Precondition(format!(
                "{} already played a card this round",
                name
            )));
        }

        // Validation done; from here on the action applies fully
        let player = self
            .players
            .get_mut(session_key)
            .ok_or_else(|| unknown_session(session_key))?;
        let card = player.hand.remove(hand_pos);
        round.submissions.push(Submission {
            card,
            owner: CardOwner {
                name: name.clone(),
                seq,
            },
        });

        let mut dealt = true;
        match self.response_deck.draw_one() {
            Ok(replacement) => player.hand.push(replacement),
            Err(e) => {
                tracing::warn!("No replacement card for {} in {}: {}", name, self.party_code, e);
                dealt = false;
            }
        }

        let round_no = round.number;
        let all_in = round.submissions.len() >= player_count - 1;
        if all_in {
            round.phase = RoundPhase::JudgeSelecting;
            self.timer.cancel();
        }

        tracing::info!("{} played card {} in round {}", name, card_id, round_no);

        let mut msg = if all_in {
            format!("{} was last player to play cards, going to judge-selecting!", name)
        } else {
            format!("{} played their card!", name)
        };
        if !dealt {
            msg.push_str(" No replacement card was dealt, the deck is empty.");
        }

        if all_in {
            self.publish(GameEvent::PhaseChanged {
                round_no,
                phase: RoundPhase::JudgeSelecting,
                reason: PhaseChangeReason::AllSubmitted,
                msg: "All players have played their cards, going to judge-selecting!"
                    .to_string(),
            });
        }

        Ok(Outcome::new(msg))
    }

    /// The judge picks the winning card among the submissions.
    ///
    /// Like [`GameEngine::submit_card`] this may start a new round before
    /// checking the caller's role, and a rejected pick leaves it in place.
    pub fn judge_pick(&mut self, session_key: &str, card_id: CardId) -> GameResult<Outcome> {
        let player = self
            .players
            .get(session_key)
            .ok_or_else(|| unknown_session(session_key))?;
        let name = player.name.clone();
        let seq = player.seq;

        if self.get_or_create_active_round().is_none() {
            return Err(not_enough_players());
        }
        let round = self.rounds.last_mut().ok_or_else(not_enough_players)?;

        if round.judge != seq {
            return Err(GameError::Precondition(format!(
                "{} is not the round judge and cannot choose the winner",
                name
            )));
        }
        if round.phase != RoundPhase::JudgeSelecting {
            return Err(GameError::Precondition(format!(
                "Cannot choose a winner while the round is {}",
                round.phase.label()
            )));
        }
        let winning = round.submission_of_card(card_id).cloned().ok_or_else(|| {
            GameError::Validation(format!("Card {} was not played this round", card_id))
        })?;

        round.phase = RoundPhase::ViewingWinner;
        round.winning_card = Some(winning.card.clone());
        round.winner = Some(winning.owner.name.clone());
        round.ended_at = Some(chrono::Utc::now());
        let round_no = round.number;
        let prompt = round.prompt.clone();

        if let Some(winner) = self.players.by_seq_mut(winning.owner.seq) {
            winner.rounds_won.push(RoundWin {
                round_no,
                response: winning.card.clone(),
                prompt,
            });
        }

        let msg = format!(
            "{} won with card {}",
            winning.owner.name, winning.card.text
        );
        tracing::info!("Round {} in {}: {}", round_no, self.party_code, msg);
        self.publish(GameEvent::PhaseChanged {
            round_no,
            phase: RoundPhase::ViewingWinner,
            reason: PhaseChangeReason::JudgePicked,
            msg: msg.clone(),
        });

        Ok(Outcome::new(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{engine_with_players, response_ids_in_play};
    use super::*;

    fn first_card(engine: &GameEngine, session: &str) -> CardId {
        engine.player(session).unwrap().hand[0].id
    }

    #[test]
    fn test_submit_moves_card_to_table() {
        let mut engine = engine_with_players(3);
        engine.get_or_create_active_round().unwrap();
        let card = first_card(&engine, "s1");

        let outcome = engine.submit_card("s1", card).unwrap();
        assert_eq!(outcome.msg, "Player1 played their card!");

        let player = engine.player("s1").unwrap();
        assert!(!player.holds(card));
        assert_eq!(player.hand.len(), 10, "replacement card dealt");

        let round = engine.active_round().unwrap();
        assert_eq!(round.submissions.len(), 1);
        assert_eq!(round.submissions[0].card.id, card);
        assert_eq!(
            round.submissions[0].owner,
            CardOwner {
                name: "Player1".to_string(),
                seq: 1
            }
        );
        assert_eq!(round.phase, RoundPhase::PlayersSelecting);
    }

    #[test]
    fn test_submit_creates_round_on_demand() {
        let mut engine = engine_with_players(3);
        let card = first_card(&engine, "s2");

        engine.submit_card("s2", card).unwrap();
        assert_eq!(engine.rounds().len(), 1);
    }

    #[test]
    fn test_judge_cannot_submit() {
        let mut engine = engine_with_players(3);
        let card = first_card(&engine, "s0");

        let err = engine.submit_card("s0", card).unwrap_err();
        assert!(matches!(err, GameError::Precondition(_)));
        assert!(engine.player("s0").unwrap().holds(card));
        assert!(engine.active_round().unwrap().submissions.is_empty());
    }

    #[test]
    fn test_rejected_actions_keep_the_new_round() {
        let mut engine = engine_with_players(3);
        let card = first_card(&engine, "s1");

        let err = engine.judge_pick("s1", card).unwrap_err();
        assert!(matches!(err, GameError::Precondition(_)));
        assert_eq!(engine.rounds().len(), 1);
        assert!(engine.active_round().unwrap().submissions.is_empty());
        assert_eq!(engine.timer().armed_round(), Some(1));
    }

    #[test]
    fn test_cannot_submit_someone_elses_card() {
        let mut engine = engine_with_players(3);
        let card = first_card(&engine, "s0");

        let err = engine.submit_card("s1", card).unwrap_err();
        assert!(matches!(err, GameError::Ownership(_)));
        assert!(engine.active_round().unwrap().submissions.is_empty());
    }

    #[test]
    fn test_resubmitting_same_card_fails() {
        let mut engine = engine_with_players(4);
        let card = first_card(&engine, "s1");

        engine.submit_card("s1", card).unwrap();
        let err = engine.submit_card("s1", card).unwrap_err();
        assert!(matches!(err, GameError::Ownership(_)));

        // A different card is refused too, one play per round
        let other = first_card(&engine, "s1");
        let err = engine.submit_card("s1", other).unwrap_err();
        assert!(matches!(err, GameError::Precondition(_)));
        assert!(engine.player("s1").unwrap().holds(other));
        assert_eq!(engine.active_round().unwrap().submissions.len(), 1);
    }

    #[test]
    fn test_unknown_session_cannot_submit() {
        let mut engine = engine_with_players(3);
        let err = engine.submit_card("nobody", 1001).unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }

    #[test]
    fn test_submit_needs_three_players() {
        let mut engine = engine_with_players(2);
        let card = first_card(&engine, "s1");

        let err = engine.submit_card("s1", card).unwrap_err();
        assert!(matches!(err, GameError::Precondition(_)));
        assert!(engine.player("s1").unwrap().holds(card));
    }

    #[test]
    fn test_last_submission_moves_to_judge_selecting() {
        let mut engine = engine_with_players(3);
        engine.get_or_create_active_round().unwrap();

        engine.submit_card("s1", first_card(&engine, "s1")).unwrap();
        assert_eq!(engine.timer().armed_round(), Some(1));

        let outcome = engine.submit_card("s2", first_card(&engine, "s2")).unwrap();
        assert!(outcome.msg.contains("last player"));
        assert_eq!(
            engine.active_round().unwrap().phase,
            RoundPhase::JudgeSelecting
        );
        assert!(engine.timer().armed_round().is_none());

        // The pending timer no longer does anything
        assert!(!engine.expire_round_timer(1));
    }

    #[test]
    fn test_cannot_submit_after_timeout() {
        let mut engine = engine_with_players(3);
        engine.get_or_create_active_round().unwrap();
        engine.expire_round_timer(1);

        let card = first_card(&engine, "s1");
        let err = engine.submit_card("s1", card).unwrap_err();
        assert!(matches!(err, GameError::Precondition(_)));
        assert!(engine.player("s1").unwrap().holds(card));
    }

    #[test]
    fn test_submit_with_empty_deck_keeps_smaller_hand() {
        let mut engine = engine_with_players(8);
        assert!(engine.response_deck().is_empty());
        engine.get_or_create_active_round().unwrap();

        let all = response_ids_in_play(&engine);
        let outcome = engine.submit_card("s1", first_card(&engine, "s1")).unwrap();

        assert!(outcome.msg.contains("No replacement card"));
        assert_eq!(engine.player("s1").unwrap().hand.len(), 9);
        assert_eq!(response_ids_in_play(&engine), all);
    }

    fn judge_selecting_engine() -> (GameEngine, CardId, CardId) {
        let mut engine = engine_with_players(3);
        engine.get_or_create_active_round().unwrap();
        let c1 = first_card(&engine, "s1");
        let c2 = first_card(&engine, "s2");
        engine.submit_card("s1", c1).unwrap();
        engine.submit_card("s2", c2).unwrap();
        (engine, c1, c2)
    }

    #[test]
    fn test_judge_pick_records_winner() {
        let (mut engine, c1, _) = judge_selecting_engine();
        let prompt = engine.active_round().unwrap().prompt.clone();

        let outcome = engine.judge_pick("s0", c1).unwrap();
        assert!(outcome.msg.starts_with("Player1 won with card"));

        let round = engine.active_round().unwrap();
        assert_eq!(round.phase, RoundPhase::ViewingWinner);
        assert_eq!(round.winner.as_deref(), Some("Player1"));
        assert_eq!(round.winning_card.as_ref().map(|c| c.id), Some(c1));
        assert!(round.ended_at.is_some());

        let winner = engine.player("s1").unwrap();
        assert_eq!(winner.rounds_won.len(), 1);
        assert_eq!(winner.rounds_won[0].round_no, 1);
        assert_eq!(winner.rounds_won[0].response.id, c1);
        assert_eq!(winner.rounds_won[0].prompt, prompt);

        assert_eq!(engine.scoreboard()[0].name, "Player1");
    }

    #[test]
    fn test_judge_pick_unplayed_card() {
        let (mut engine, _, _) = judge_selecting_engine();
        let unplayed = first_card(&engine, "s1");

        let err = engine.judge_pick("s0", unplayed).unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));

        let round = engine.active_round().unwrap();
        assert_eq!(round.phase, RoundPhase::JudgeSelecting);
        assert!(round.winner.is_none());
    }

    #[test]
    fn test_only_judge_can_pick() {
        let (mut engine, c1, _) = judge_selecting_engine();

        let err = engine.judge_pick("s2", c1).unwrap_err();
        assert!(matches!(err, GameError::Precondition(_)));
        assert_eq!(
            engine.active_round().unwrap().phase,
            RoundPhase::JudgeSelecting
        );
        assert!(engine.player("s1").unwrap().rounds_won.is_empty());
    }

    #[test]
    fn test_judge_pick_requires_judge_selecting() {
        let mut engine = engine_with_players(3);
        engine.get_or_create_active_round().unwrap();
        let c1 = first_card(&engine, "s1");
        engine.submit_card("s1", c1).unwrap();

        let err = engine.judge_pick("s0", c1).unwrap_err();
        assert!(matches!(err, GameError::Precondition(_)));
        assert_eq!(
            engine.active_round().unwrap().phase,
            RoundPhase::PlayersSelecting
        );
    }

    #[test]
    fn test_judge_cannot_pick_twice() {
        let (mut engine, c1, c2) = judge_selecting_engine();
        engine.judge_pick("s0", c1).unwrap();

        let err = engine.judge_pick("s0", c2).unwrap_err();
        assert!(matches!(err, GameError::Precondition(_)));
        assert_eq!(
            engine.active_round().unwrap().winner.as_deref(),
            Some("Player1")
        );
    }
}
