//! Card records and search parameters.

use super::SearchExpression;
use serde::Deserialize;

/// Result ordering accepted by the Scryfall search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchOrder {
    /// EDHREC popularity ranking (default).
    #[default]
    Edhrec,
    /// Alphabetical by card name.
    Name,
    /// Most recently released first.
    Released,
}

impl SearchOrder {
    /// Returns the order as the API's query-parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Edhrec => "edhrec",
            Self::Name => "name",
            Self::Released => "released",
        }
    }

    /// Parses an order string, falling back to the default.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "name" => Self::Name,
            "released" => Self::Released,
            _ => Self::Edhrec,
        }
    }
}

/// Uniqueness mode accepted by the Scryfall search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UniqueMode {
    /// One result per card name (default).
    #[default]
    Cards,
    /// One result per unique artwork.
    Art,
    /// Every printing.
    Prints,
}

impl UniqueMode {
    /// Returns the mode as the API's query-parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cards => "cards",
            Self::Art => "art",
            Self::Prints => "prints",
        }
    }

    /// Parses a uniqueness string, falling back to the default.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "art" => Self::Art,
            "prints" => Self::Prints,
            _ => Self::Cards,
        }
    }
}

/// Image URI block on a raw Scryfall card object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImageUris {
    /// The normal-resolution image.
    #[serde(default)]
    pub normal: String,
}

/// One face of a multi-faced raw card object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCardFace {
    /// Per-face image URIs.
    #[serde(default)]
    pub image_uris: Option<RawImageUris>,
}

/// Raw card object as returned by the Scryfall search API.
///
/// Only the fields deckwise projects into a [`CardRecord`] are deserialized;
/// everything else in the payload is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCard {
    /// Card name.
    #[serde(default)]
    pub name: String,
    /// Mana cost in `{W}{U}`-style symbols.
    #[serde(default)]
    pub mana_cost: String,
    /// Type line, e.g. `Creature — Goblin`.
    #[serde(default)]
    pub type_line: String,
    /// Rules text.
    #[serde(default)]
    pub oracle_text: String,
    /// Top-level image URIs; absent on double-faced cards.
    #[serde(default)]
    pub image_uris: Option<RawImageUris>,
    /// Card faces; present on double-faced cards.
    #[serde(default)]
    pub card_faces: Vec<RawCardFace>,
    /// Permalink to the card on Scryfall.
    #[serde(default)]
    pub scryfall_uri: String,
    /// Rarity.
    #[serde(default)]
    pub rarity: String,
    /// Name of the set the printing belongs to.
    #[serde(default)]
    pub set_name: String,
}

impl RawCard {
    /// Resolves the display image URI.
    ///
    /// Double-faced cards carry no top-level `image_uris`; the first face's
    /// image is used instead. Cards with neither resolve to an empty string.
    #[must_use]
    pub fn display_image_uri(&self) -> String {
        if let Some(ref uris) = self.image_uris {
            return uris.normal.clone();
        }
        self.card_faces
            .first()
            .and_then(|face| face.image_uris.as_ref())
            .map(|uris| uris.normal.clone())
            .unwrap_or_default()
    }
}

/// Normalized projection of one matched card.
///
/// Every textual field defaults to an empty string rather than being
/// omitted, so downstream formatting never has to branch on presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    /// Card name.
    pub name: String,
    /// Mana cost.
    pub mana_cost: String,
    /// Type line.
    pub type_line: String,
    /// Rules text.
    pub oracle_text: String,
    /// Display image URI, possibly resolved from the first card face.
    pub image_uri: String,
    /// Permalink to the card on Scryfall.
    pub scryfall_uri: String,
    /// Rarity.
    pub rarity: String,
    /// Set name.
    pub set_name: String,
    /// The search expression this card was found under.
    pub expression: SearchExpression,
}

impl CardRecord {
    /// Builds a record from a raw API card, tagging it with the expression
    /// that found it.
    #[must_use]
    pub fn from_raw(raw: &RawCard, expression: SearchExpression) -> Self {
        Self {
            name: raw.name.clone(),
            mana_cost: raw.mana_cost.clone(),
            type_line: raw.type_line.clone(),
            oracle_text: raw.oracle_text.clone(),
            image_uri: raw.display_image_uri(),
            scryfall_uri: raw.scryfall_uri.clone(),
            rarity: raw.rarity.clone(),
            set_name: raw.set_name.clone(),
            expression,
        }
    }
}
