use super::GameEngine;
use crate::error::{GameError, GameResult};
use crate::types::*;
use std::collections::HashMap;

/// Players of one game, keyed by session and ordered by sequence index
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<SessionKey, Player>,
    /// Session keys in join order; index == sequence index
    order: Vec<SessionKey>,
}

impl PlayerRegistry {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, session_key: &str) -> bool {
        self.players.contains_key(session_key)
    }

    pub fn get(&self, session_key: &str) -> Option<&Player> {
        self.players.get(session_key)
    }

    pub fn get_mut(&mut self, session_key: &str) -> Option<&mut Player> {
        self.players.get_mut(session_key)
    }

    pub fn by_seq(&self, seq: usize) -> Option<&Player> {
        self.order.get(seq).and_then(|key| self.players.get(key))
    }

    pub fn by_seq_mut(&mut self, seq: usize) -> Option<&mut Player> {
        let key = self.order.get(seq)?;
        self.players.get_mut(key)
    }

    /// Next free sequence index
    pub fn next_seq(&self) -> usize {
        self.order.len()
    }

    fn insert(&mut self, player: Player) {
        debug_assert_eq!(player.seq, self.order.len());
        self.order.push(player.session_key.clone());
        self.players.insert(player.session_key.clone(), player);
    }

    /// Players in sequence order
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.order.iter().filter_map(|key| self.players.get(key))
    }
}

impl GameEngine {
    /// Register a new player and deal them a full hand
    pub fn join(&mut self, name: &str, session_key: &str) -> GameResult<&Player> {
        let name = name.trim();

        // Session keys are stored and looked up verbatim
        if name.is_empty() || session_key.trim().is_empty() {
            tracing::warn!(
                "Rejected join to {}: name and session are required",
                self.party_code
            );
            return Err(GameError::Validation(
                "A name and a session are required to join".to_string(),
            ));
        }

        if self.players.contains(session_key) {
            tracing::warn!(
                "Rejected join to {}: session already registered",
                self.party_code
            );
            return Err(GameError::Conflict(format!(
                "This session has already joined party {}",
                self.party_code
            )));
        }

        let hand_size = self.config.hand_size;
        if self.response_deck.len() < hand_size {
            tracing::warn!(
                "Cannot add {} to {}, response deck has run out of cards",
                name,
                self.party_code
            );
            return Err(GameError::ResourceExhausted(
                "Cannot join, the response deck has run out of cards".to_string(),
            ));
        }

        let hand = self.response_deck.draw(hand_size)?;
        let seq = self.players.next_seq();
        self.players.insert(Player {
            session_key: session_key.to_string(),
            name: name.to_string(),
            seq,
            hand,
            rounds_won: Vec::new(),
        });

        tracing::info!("{} joined {} as player {}", name, self.party_code, seq);
        self.publish(GameEvent::PlayerJoined {
            name: name.to_string(),
            seq,
            player_count: self.players.len(),
        });

        self.players
            .get(session_key)
            .ok_or_else(|| GameError::NotFound("Player vanished after joining".to_string()))
    }

    /// Look up a player by session
    pub fn player(&self, session_key: &str) -> Option<&Player> {
        self.players.get(session_key)
    }

    /// All players in sequence order
    pub fn players(&self) -> Vec<&Player> {
        self.players.iter().collect()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Move the card at `from` to position `to` in the player's hand
    pub fn reorder_hand(&mut self, session_key: &str, from: usize, to: usize) -> GameResult<Outcome> {
        let player = self
            .players
            .get_mut(session_key)
            .ok_or_else(|| unknown_session(session_key))?;

        let len = player.hand.len();
        if from >= len || to >= len {
            return Err(GameError::Validation(format!(
                "Cannot move card {} to {}, hand has {} cards",
                from, to, len
            )));
        }

        let moved = player.hand[from].clone();
        let mut reordered: Vec<Card> = player
            .hand
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != from)
            .map(|(_, card)| card.clone())
            .collect();
        reordered.insert(to, moved);
        player.hand = reordered;

        Ok(Outcome::new(format!(
            "Moved card {} to {} for {}",
            from, to, player.name
        )))
    }

    /// Players ranked by rounds won, ties broken by join order
    pub fn scoreboard(&self) -> Vec<ScoreEntry> {
        let mut scores: Vec<ScoreEntry> = self
            .players
            .iter()
            .map(|p| ScoreEntry {
                name: p.name.clone(),
                seq: p.seq,
                wins: p.rounds_won.len(),
            })
            .collect();

        scores.sort_by(|a, b| b.wins.cmp(&a.wins).then(a.seq.cmp(&b.seq)));
        scores
    }
}

pub(super) fn unknown_session(session_key: &str) -> GameError {
    tracing::debug!("Unknown session {}", session_key);
    GameError::NotFound("You are not a player in this game".to_string())
}

#[cfg(test)]
mod tests {
    use super::super::tests::{engine, engine_with_players};
    use super::*;

    #[test]
    fn test_join_deals_a_hand() {
        let mut engine = engine();
        let before = engine.response_deck().len();

        let player = engine.join("Yusuf", "session-1").unwrap();
        assert_eq!(player.name, "Yusuf");
        assert_eq!(player.seq, 0);
        assert_eq!(player.hand.len(), 10);
        assert!(player.rounds_won.is_empty());

        assert_eq!(engine.response_deck().len(), before - 10);
    }

    #[test]
    fn test_sequence_indices_follow_join_order() {
        let engine = engine_with_players(4);
        let seqs: Vec<_> = engine.players().iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3]);
        assert_eq!(engine.player("s2").unwrap().name, "Player2");
    }

    #[test]
    fn test_join_requires_name_and_session() {
        let mut engine = engine();

        let err = engine.join("  ", "session-1").unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));

        let err = engine.join("Salman", "").unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));

        assert_eq!(engine.player_count(), 0);
    }

    #[test]
    fn test_duplicate_session_is_a_conflict() {
        let mut engine = engine_with_players(1);
        let before = engine.response_deck().len();

        let err = engine.join("Impostor", "s0").unwrap_err();
        assert!(matches!(err, GameError::Conflict(_)));

        assert_eq!(engine.player("s0").unwrap().name, "Player0");
        assert_eq!(engine.player_count(), 1);
        assert_eq!(engine.response_deck().len(), before);
    }

    #[test]
    fn test_join_fails_when_deck_runs_low() {
        let mut engine = engine();
        let capacity = engine.response_deck().len() / 10;
        for i in 0..capacity {
            engine.join(&format!("P{}", i), &format!("s{}", i)).unwrap();
        }

        let remaining = engine.response_deck().len();
        let err = engine.join("Late", "late").unwrap_err();
        assert!(matches!(err, GameError::ResourceExhausted(_)));
        assert_eq!(engine.response_deck().len(), remaining);
        assert!(engine.player("late").is_none());
    }

    #[test]
    fn test_session_key_used_verbatim() {
        let mut engine = engine_with_players(2);

        engine.join("Ann", " s9 ").unwrap();
        assert_eq!(engine.player(" s9 ").unwrap().name, "Ann");
        assert!(engine.player("s9").is_none());

        engine.get_or_create_active_round().unwrap();
        let card = engine.player(" s9 ").unwrap().hand[0].id;
        engine.submit_card(" s9 ", card).unwrap();
        assert_eq!(
            engine.view_for(" s9 ").unwrap().status,
            PlayerStatus::PlayerWaiting
        );
        assert!(matches!(
            engine.join("Ann", " s9 "),
            Err(GameError::Conflict(_))
        ));
    }

    #[test]
    fn test_lookup_unknown_session() {
        let engine = engine_with_players(1);
        assert!(engine.player("nobody").is_none());
    }

    #[test]
    fn test_reorder_hand_moves_one_card() {
        let mut engine = engine_with_players(1);
        let before: Vec<_> = engine.player("s0").unwrap().hand.iter().map(|c| c.id).collect();

        engine.reorder_hand("s0", 0, 3).unwrap();

        let after: Vec<_> = engine.player("s0").unwrap().hand.iter().map(|c| c.id).collect();
        let mut expected = before.clone();
        let moved = expected.remove(0);
        expected.insert(3, moved);
        assert_eq!(after, expected);

        engine.reorder_hand("s0", 9, 0).unwrap();
        let last_first: Vec<_> = engine.player("s0").unwrap().hand.iter().map(|c| c.id).collect();
        assert_eq!(last_first[0], expected[9]);
        assert_eq!(last_first.len(), 10);
    }

    #[test]
    fn test_reorder_hand_rejects_bad_input() {
        let mut engine = engine_with_players(1);
        let before = engine.player("s0").unwrap().hand.clone();

        let err = engine.reorder_hand("s0", 0, 10).unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));
        assert_eq!(engine.player("s0").unwrap().hand, before);

        let err = engine.reorder_hand("nobody", 0, 1).unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }

    #[test]
    fn test_scoreboard_starts_even() {
        let engine = engine_with_players(3);
        let scores = engine.scoreboard();
        assert_eq!(scores.len(), 3);
        assert!(scores.iter().all(|s| s.wins == 0));
        assert_eq!(scores[0].name, "Player0");
    }
}
