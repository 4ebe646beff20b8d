use crate::error::{GameError, GameResult};
use crate::types::{Card, CardId, CardKind};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Pool of not-yet-drawn cards of a single kind
#[derive(Debug, Clone)]
pub struct Deck {
    kind: CardKind,
    cards: VecDeque<Card>,
}

impl Deck {
    /// Create a deck, rejecting cards of the wrong kind
    pub fn new(kind: CardKind, cards: Vec<Card>) -> GameResult<Self> {
        if let Some(card) = cards.iter().find(|c| c.kind != kind) {
            return Err(GameError::Validation(format!(
                "Card {} is a {:?} card and cannot seed the {:?} deck",
                card.id, card.kind, kind
            )));
        }

        Ok(Self {
            kind,
            cards: cards.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.cards.iter().any(|c| c.id == card_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.cards.iter().map(|c| c.id)
    }

    /// Remove and return the front card
    pub fn draw_one(&mut self) -> GameResult<Card> {
        self.cards.pop_front().ok_or_else(|| self.exhausted(1))
    }

    /// Draw `count` cards, or none at all if fewer remain
    pub fn draw(&mut self, count: usize) -> GameResult<Vec<Card>> {
        if self.cards.len() < count {
            return Err(self.exhausted(count));
        }
        Ok(self.cards.drain(..count).collect())
    }

    /// Put cards back at the bottom of the deck
    pub fn return_cards(&mut self, cards: impl IntoIterator<Item = Card>) {
        for card in cards {
            debug_assert_eq!(card.kind, self.kind, "card returned to the wrong deck");
            self.cards.push_back(card);
        }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.make_contiguous().shuffle(rng);
    }

    fn exhausted(&self, wanted: usize) -> GameError {
        GameError::ResourceExhausted(format!(
            "{:?} deck has {} cards left, {} needed",
            self.kind,
            self.cards.len(),
            wanted
        ))
    }
}
