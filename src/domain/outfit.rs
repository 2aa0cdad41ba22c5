//! Outfit composition types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::WardrobeItem;

/// Occasions offered by the outfit creator. The field itself stays free
/// text so imported or AI-produced values survive round-trips.
pub const KNOWN_OCCASIONS: [&str; 5] = ["casual", "work", "formal", "sport", "other"];

/// The four wearable slots an outfit can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutfitSlot {
    Tops,
    Bottoms,
    Shoes,
    Outerwear,
}

impl OutfitSlot {
    pub const ALL: [Self; 4] = [Self::Tops, Self::Bottoms, Self::Shoes, Self::Outerwear];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tops => "tops",
            Self::Bottoms => "bottoms",
            Self::Shoes => "shoes",
            Self::Outerwear => "outerwear",
        }
    }
}

impl fmt::Display for OutfitSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slot-to-item mapping. Every slot is optional; an outfit with a single
/// filled slot is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutfitItems {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tops: Option<WardrobeItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottoms: Option<WardrobeItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoes: Option<WardrobeItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outerwear: Option<WardrobeItem>,
}

impl OutfitItems {
    pub fn get(&self, slot: OutfitSlot) -> Option<&WardrobeItem> {
        match slot {
            OutfitSlot::Tops => self.tops.as_ref(),
            OutfitSlot::Bottoms => self.bottoms.as_ref(),
            OutfitSlot::Shoes => self.shoes.as_ref(),
            OutfitSlot::Outerwear => self.outerwear.as_ref(),
        }
    }

    pub fn set(&mut self, slot: OutfitSlot, item: Option<WardrobeItem>) {
        match slot {
            OutfitSlot::Tops => self.tops = item,
            OutfitSlot::Bottoms => self.bottoms = item,
            OutfitSlot::Shoes => self.shoes = item,
            OutfitSlot::Outerwear => self.outerwear = item,
        }
    }

    pub fn is_empty(&self) -> bool {
        OutfitSlot::ALL.into_iter().all(|slot| self.get(slot).is_none())
    }

    /// Filled slots in wearing order.
    pub fn filled(&self) -> impl Iterator<Item = (OutfitSlot, &WardrobeItem)> {
        OutfitSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|item| (slot, item)))
    }
}

/// A saved outfit. Immutable once created; deletion keys on `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Outfit {
    /// Unique, time-derived identifier (millisecond timestamp).
    pub id: String,
    pub name: String,
    pub occasion: String,
    pub items: OutfitItems,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Present only on AI-generated outfits: the model's styling rationale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(rename = "isAIGenerated", default)]
    pub is_ai_generated: bool,
}
