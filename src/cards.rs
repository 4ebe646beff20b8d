//! Card content providers used to seed a game's decks

use crate::types::{Card, CardId};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Supplies the fixed prompt and response card sets for a new game.
///
/// The two sets must not share card ids.
pub trait CardSource: Send + Sync {
    fn prompts(&self) -> Vec<Card>;
    fn responses(&self) -> Vec<Card>;
}

#[derive(Debug, thiserror::Error)]
pub enum CardSourceError {
    #[error("Failed to read card file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse card file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Card file has no {0} cards")]
    Empty(&'static str),
}

const PROMPT_ID_BASE: CardId = 1;
const RESPONSE_ID_BASE: CardId = 1001;

const PROMPTS: &[&str] = &[
    "My grandmother's secret recipe calls for a pinch of ____.",
    "The new museum exhibit is dedicated entirely to ____.",
    "What's the real reason the meeting ran two hours over?",
    "Scientists have finally discovered what cats are thinking about: ____.",
    "The least popular theme park ride: ____.",
    "I wasn't ready for ____ on the first date.",
    "The villain's master plan hinges on ____.",
    "What did I find in the back of the fridge?",
    "Coming this summer: ____, the musical.",
    "The secret to a long and happy life is ____.",
    "What's the worst thing to bring to a potluck?",
    "Breaking news: local man arrested for ____.",
    "My therapist says I need to stop ____.",
    "The hotel's only amenity was ____.",
    "Nobody expected the wedding toast to mention ____.",
    "What will archaeologists find buried under our city?",
    "The new fitness craze everyone is talking about: ____.",
    "Grandpa's last words were about ____.",
    "I quit my job to pursue ____ full-time.",
    "What's hiding in the office supply closet?",
    "The school board banned ____ after last year's incident.",
    "Tonight's dinner special: ____ with a side of ____.",
    "The real star of the nature documentary: ____.",
    "What's my superpower?",
];

const RESPONSES: &[&str] = &[
    "A suspiciously confident pigeon",
    "Interpretive dance",
    "Three raccoons in a trench coat",
    "A lukewarm bowl of soup",
    "The sudden realization that it's Monday",
    "An unreasonable amount of glitter",
    "Aggressive napping",
    "A haunted vending machine",
    "My collection of novelty spoons",
    "Forgetting the lyrics halfway through",
    "A very small horse",
    "The Wi-Fi password",
    "Passive-aggressive sticky notes",
    "A goat with a business plan",
    "Competitive knitting",
    "The last slice of pizza",
    "An inflatable castle",
    "Yelling into the void",
    "A motivational poster about cheese",
    "Socks with sandals",
    "A thousand rubber ducks",
    "Emotional support cactus",
    "Doing taxes by candlelight",
    "An overly detailed spreadsheet",
    "Mysterious noises from the basement",
    "A time-traveling toaster",
    "Jazz hands",
    "The group chat",
    "A dramatic slow clap",
    "Regret",
    "A llama in sunglasses",
    "Synchronized swimming",
    "My browser history",
    "A sourdough starter named Gerald",
    "Unsolicited life advice",
    "A karaoke machine at 3 a.m.",
    "The smell of burnt popcorn",
    "An extremely loud sneeze",
    "Tiny hats for squirrels",
    "A PowerPoint presentation",
    "Accidentally replying all",
    "A disappointing magic trick",
    "Moonwalking",
    "The neighbor's leaf blower",
    "A questionable tattoo",
    "Free samples",
    "An existential crisis",
    "Bubble wrap",
    "A marching band",
    "Pineapple on pizza",
    "The fax machine",
    "A motivational speech from a parrot",
    "Pretending to understand wine",
    "A trampoline",
    "Lost luggage",
    "A strongly worded letter",
    "Elevator music",
    "Fifteen cats",
    "A surprise audit",
    "Dad jokes",
    "An abandoned shopping cart",
    "Breakfast for dinner",
    "A suspicious casserole",
    "Running late",
    "Self-checkout machines",
    "A bowling ball",
    "The floor is lava",
    "A very long receipt",
    "Mime school",
    "A confused robot",
    "The entire cast of a soap opera",
    "A fog machine",
    "A rubber chicken",
    "Cold spaghetti",
    "A pyramid scheme",
    "Interrupting cow",
    "Inspirational quotes",
    "A lifetime supply of mayonnaise",
    "The hokey pokey",
    "A nap that went on too long",
];

/// The deck compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCards;

impl CardSource for BuiltinCards {
    fn prompts(&self) -> Vec<Card> {
        PROMPTS
            .iter()
            .zip(PROMPT_ID_BASE..)
            .map(|(text, id)| Card::prompt(id, *text))
            .collect()
    }

    fn responses(&self) -> Vec<Card> {
        RESPONSES
            .iter()
            .zip(RESPONSE_ID_BASE..)
            .map(|(text, id)| Card::response(id, *text))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct CardEntry {
    id: CardId,
    text: String,
}

#[derive(Debug, Deserialize)]
struct CardFile {
    prompts: Vec<CardEntry>,
    responses: Vec<CardEntry>,
}

/// Cards loaded from a JSON file:
/// `{ "prompts": [{"id": 1, "text": "..."}], "responses": [...] }`
#[derive(Debug, Clone)]
pub struct JsonCards {
    prompts: Vec<Card>,
    responses: Vec<Card>,
}

impl JsonCards {
    pub fn from_json(json: &str) -> Result<Self, CardSourceError> {
        let file: CardFile = serde_json::from_str(json)?;

        if file.prompts.is_empty() {
            return Err(CardSourceError::Empty("prompt"));
        }
        if file.responses.is_empty() {
            return Err(CardSourceError::Empty("response"));
        }

        Ok(Self {
            prompts: file
                .prompts
                .into_iter()
                .map(|e| Card::prompt(e.id, e.text))
                .collect(),
            responses: file
                .responses
                .into_iter()
                .map(|e| Card::response(e.id, e.text))
                .collect(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, CardSourceError> {
        let json = std::fs::read_to_string(path).map_err(|source| CardSourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cards = Self::from_json(&json)?;
        tracing::info!(
            "Loaded {} prompt and {} response cards from {}",
            cards.prompts.len(),
            cards.responses.len(),
            path.display()
        );
        Ok(cards)
    }
}

impl CardSource for JsonCards {
    fn prompts(&self) -> Vec<Card> {
        self.prompts.clone()
    }

    fn responses(&self) -> Vec<Card> {
        self.responses.clone()
    }
}
