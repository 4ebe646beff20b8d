mod party;

pub use party::Party;

use crate::cards::{BuiltinCards, CardSource};
use crate::engine::GameEngine;
use crate::error::{GameError, GameResult};
use crate::types::*;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Safe character set for party codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
pub const CODE_LENGTH: usize = 5;

/// Generate a random party code
fn generate_short_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Uppercase a client-supplied party code and check its shape
pub fn normalize_code(code: &str) -> GameResult<PartyCode> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != CODE_LENGTH || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(GameError::Validation(format!(
            "Party code must be {} letters or digits",
            CODE_LENGTH
        )));
    }
    Ok(code)
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub parties: Arc<RwLock<HashMap<PartyCode, Party>>>,
    pub config: GameConfig,
    pub cards: Arc<dyn CardSource>,
}

impl AppState {
    pub fn new(config: GameConfig, cards: Arc<dyn CardSource>) -> Self {
        Self {
            parties: Arc::new(RwLock::new(HashMap::new())),
            config,
            cards,
        }
    }

    fn new_party(&self, code: PartyCode) -> GameResult<Party> {
        let engine = GameEngine::new(code, self.config.clone(), self.cards.as_ref())?;
        Ok(Party::new(engine))
    }

    /// Create a party under a fresh, unused code
    pub async fn create_party(&self) -> GameResult<Party> {
        let mut parties = self.parties.write().await;
        let code = loop {
            let code = generate_short_code();
            if !parties.contains_key(&code) {
                break code;
            }
            // Collision - try again
        };

        let party = self.new_party(code.clone())?;
        parties.insert(code.clone(), party.clone());
        tracing::info!("Created party {} ({} active)", code, parties.len());
        Ok(party)
    }

    /// Look up a party by code, creating it on first use
    pub async fn get_or_create_party(&self, code: &str) -> GameResult<Party> {
        let code = normalize_code(code)?;
        if let Some(party) = self.parties.read().await.get(&code) {
            return Ok(party.clone());
        }

        let mut parties = self.parties.write().await;
        // Someone may have created it between the two locks
        if let Some(party) = parties.get(&code) {
            return Ok(party.clone());
        }
        let party = self.new_party(code.clone())?;
        parties.insert(code.clone(), party.clone());
        tracing::info!("Created party {} on first connection", code);
        Ok(party)
    }

    pub async fn get_party(&self, code: &str) -> Option<Party> {
        let code = normalize_code(code).ok()?;
        self.parties.read().await.get(&code).cloned()
    }

    pub async fn remove_party(&self, code: &str) -> Option<Party> {
        let code = normalize_code(code).ok()?;
        let removed = self.parties.write().await.remove(&code);
        if removed.is_some() {
            tracing::info!("Removed party {}", code);
        }
        removed
    }

    pub async fn party_count(&self) -> usize {
        self.parties.read().await.len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(GameConfig::default(), Arc::new(BuiltinCards))
    }
}
