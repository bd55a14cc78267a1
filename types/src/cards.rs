//! The matter/consciousness deck.
//!
//! A deck is three static tables: the material prompts, the consciousness
//! candidates, and the pairings between them. Correctness of a match is a
//! lookup in the pairing table, never computed.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialCardId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsciousCardId(pub u16);

/// A "matter" prompt drawn by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialCard {
    pub id: MaterialCardId,
    pub content: &'static str,
    /// Scientific note shown in the feedback after a correct match.
    pub detail: &'static str,
}

/// A "consciousness" candidate the player can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsciousCard {
    pub id: ConsciousCardId,
    pub content: &'static str,
    pub detail: &'static str,
}

/// The one correct consciousness card for a material card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub material: MaterialCardId,
    pub conscious: ConsciousCardId,
    /// How the two sides act on each other.
    pub interaction: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("deck has no material cards")]
    Empty,
    #[error("duplicate material card id {0:?}")]
    DuplicateMaterial(MaterialCardId),
    #[error("duplicate consciousness card id {0:?}")]
    DuplicateConscious(ConsciousCardId),
    #[error("material card {0:?} has no pairing")]
    Unpaired(MaterialCardId),
    #[error("material card {0:?} has more than one pairing")]
    AmbiguousPairing(MaterialCardId),
    #[error("pairing references unknown material card {0:?}")]
    UnknownMaterial(MaterialCardId),
    #[error("pairing references unknown consciousness card {0:?}")]
    UnknownConscious(ConsciousCardId),
    #[error("consciousness card {0:?} is the answer to more than one material card")]
    SharedAnswer(ConsciousCardId),
}

/// A validated set of cards and pairings.
#[derive(Debug, Clone, Copy)]
pub struct Deck {
    material: &'static [MaterialCard],
    conscious: &'static [ConsciousCard],
    pairings: &'static [Pairing],
}

impl Deck {
    /// Build a deck, checking that every material card has exactly one
    /// pairing and that every pairing points at cards that exist.
    pub fn new(
        material: &'static [MaterialCard],
        conscious: &'static [ConsciousCard],
        pairings: &'static [Pairing],
    ) -> Result<Self, DeckError> {
        if material.is_empty() {
            return Err(DeckError::Empty);
        }
        for (i, card) in material.iter().enumerate() {
            if material[..i].iter().any(|c| c.id == card.id) {
                return Err(DeckError::DuplicateMaterial(card.id));
            }
        }
        for (i, card) in conscious.iter().enumerate() {
            if conscious[..i].iter().any(|c| c.id == card.id) {
                return Err(DeckError::DuplicateConscious(card.id));
            }
        }
        for (i, pairing) in pairings.iter().enumerate() {
            if !material.iter().any(|c| c.id == pairing.material) {
                return Err(DeckError::UnknownMaterial(pairing.material));
            }
            if !conscious.iter().any(|c| c.id == pairing.conscious) {
                return Err(DeckError::UnknownConscious(pairing.conscious));
            }
            if pairings[..i].iter().any(|p| p.material == pairing.material) {
                return Err(DeckError::AmbiguousPairing(pairing.material));
            }
            if pairings[..i].iter().any(|p| p.conscious == pairing.conscious) {
                return Err(DeckError::SharedAnswer(pairing.conscious));
            }
        }
        if let Some(card) = material
            .iter()
            .find(|card| !pairings.iter().any(|p| p.material == card.id))
        {
            return Err(DeckError::Unpaired(card.id));
        }

        Ok(Self {
            material,
            conscious,
            pairings,
        })
    }

    /// The built-in eight-pair deck.
    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            material: MATERIAL_CARDS,
            conscious: CONSCIOUS_CARDS,
            pairings: PAIRINGS,
        }
    }

    #[must_use]
    pub fn material_cards(&self) -> &'static [MaterialCard] {
        self.material
    }

    #[must_use]
    pub fn conscious_cards(&self) -> &'static [ConsciousCard] {
        self.conscious
    }

    #[must_use]
    pub fn material(&self, id: MaterialCardId) -> Option<&'static MaterialCard> {
        self.material.iter().find(|card| card.id == id)
    }

    #[must_use]
    pub fn conscious(&self, id: ConsciousCardId) -> Option<&'static ConsciousCard> {
        self.conscious.iter().find(|card| card.id == id)
    }

    #[must_use]
    pub fn pairing_for(&self, material: MaterialCardId) -> Option<&'static Pairing> {
        self.pairings.iter().find(|p| p.material == material)
    }

    #[must_use]
    pub fn is_match(&self, material: MaterialCardId, conscious: ConsciousCardId) -> bool {
        self.pairing_for(material)
            .is_some_and(|p| p.conscious == conscious)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.material.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.material.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::builtin()
    }
}

const fn material(id: u16, content: &'static str, detail: &'static str) -> MaterialCard {
    MaterialCard {
        id: MaterialCardId(id),
        content,
        detail,
    }
}

const fn conscious(id: u16, content: &'static str, detail: &'static str) -> ConsciousCard {
    ConsciousCard {
        id: ConsciousCardId(id),
        content,
        detail,
    }
}

const fn pair(material: u16, conscious: u16, interaction: &'static str) -> Pairing {
    Pairing {
        material: MaterialCardId(material),
        conscious: ConsciousCardId(conscious),
        interaction,
    }
}

pub const MATERIAL_CARDS: &[MaterialCard] = &[
    material(
        1,
        "A stone falling to the ground",
        "Gravity accelerates the stone at roughly 9.8 m/s² until it hits the ground.",
    ),
    material(
        2,
        "Water boiling at 100°C",
        "At sea-level pressure, water molecules gain enough energy at 100°C to escape as vapour.",
    ),
    material(
        3,
        "Sunlight on the skin",
        "Infrared radiation from the sun is absorbed by the skin and raises its temperature.",
    ),
    material(
        4,
        "A sudden loud noise",
        "A pressure wave reaches the ear and triggers the auditory nerve within milliseconds.",
    ),
    material(
        5,
        "Neurons firing in the brain",
        "Electrochemical signals pass across synapses through networks of billions of neurons.",
    ),
    material(
        6,
        "Food reaching an empty stomach",
        "Stretch receptors and hormones such as leptin signal that energy intake has begun.",
    ),
    material(
        7,
        "Sound waves of a melody",
        "Vibrations at ordered frequencies and rhythms travel through the air to the cochlea.",
    ),
    material(
        8,
        "Light reflecting off a red apple",
        "The apple's surface absorbs most wavelengths and reflects light around 700 nm.",
    ),
];

pub const CONSCIOUS_CARDS: &[ConsciousCard] = &[
    conscious(
        1,
        "Understanding the law of gravity",
        "Repeatedly seeing objects fall lets the mind abstract a general law.",
    ),
    conscious(
        2,
        "Knowledge of boiling points",
        "Observation and measurement become reusable knowledge about temperature.",
    ),
    conscious(
        3,
        "A pleasant feeling of warmth",
        "The sensation of warmth is the subjective side of the skin heating up.",
    ),
    conscious(
        4,
        "A flash of fear",
        "The amygdala tags the unexpected sound as a possible threat.",
    ),
    conscious(
        5,
        "A passing thought",
        "Thinking is experienced as ideas, not as the electrochemical activity behind it.",
    ),
    conscious(
        6,
        "A sense of satisfaction",
        "The body's chemical signals are felt as hunger easing into contentment.",
    ),
    conscious(
        7,
        "Being moved by music",
        "Patterns in sound are interpreted as mood, memory and emotion.",
    ),
    conscious(
        8,
        "Perceiving the colour red",
        "The brain turns a wavelength into the lived quality of redness.",
    ),
];

pub const PAIRINGS: &[Pairing] = &[
    pair(
        1,
        1,
        "Matter in motion, observed again and again, becomes a scientific concept in consciousness.",
    ),
    pair(
        2,
        2,
        "A physical regularity is reflected in the mind as practical knowledge.",
    ),
    pair(
        3,
        3,
        "Energy absorbed by the body is reflected in consciousness as a feeling.",
    ),
    pair(
        4,
        4,
        "A material stimulus provokes an emotional response that prepares the body to act.",
    ),
    pair(
        5,
        5,
        "Consciousness is a property of highly organised matter: the brain.",
    ),
    pair(
        6,
        6,
        "Material needs of the body shape the states of the mind.",
    ),
    pair(
        7,
        7,
        "Consciousness actively interprets matter, giving physical sound meaning.",
    ),
    pair(
        8,
        8,
        "Sensation is the subjective image of the objective world.",
    ),
];
