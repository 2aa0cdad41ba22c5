//! Outfit use cases: manual composition, deletion, and AI generation.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::item::{Category, WardrobeItem};
use crate::domain::outfit::{Outfit, OutfitItems, OutfitSlot};
use crate::domain::repositories::{OutfitRepository, WardrobeRepository};
use crate::infrastructure::ai::{AiError, ChatModel};

const SYSTEM_PROMPT: &str = "You are a personal stylist assembling outfits from a user's \
    wardrobe. Answer only with a single JSON object, no prose and no code fences.";

#[derive(Error, Debug)]
pub enum OutfitError {
    #[error("an outfit needs at least one item")]
    EmptyDraft,

    #[error("no wardrobe items available for outfit slots")]
    EmptyWardrobe,

    #[error("AI outfit generation is not configured")]
    GeneratorUnavailable,

    #[error("could not understand the generator reply: {0}")]
    MalformedReply(String),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// User-assembled outfit awaiting an identity.
#[derive(Debug, Clone, Default)]
pub struct OutfitDraft {
    pub name: String,
    pub occasion: String,
    pub notes: Option<String>,
    pub items: OutfitItems,
}

/// What the model is asked to answer with.
#[derive(Debug, Deserialize)]
struct GeneratedReply {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    items: GeneratedPicks,
}

#[derive(Debug, Default, Deserialize)]
struct GeneratedPicks {
    tops: Option<usize>,
    bottoms: Option<usize>,
    shoes: Option<usize>,
    outerwear: Option<usize>,
}

impl GeneratedPicks {
    fn get(&self, slot: OutfitSlot) -> Option<usize> {
        match slot {
            OutfitSlot::Tops => self.tops,
            OutfitSlot::Bottoms => self.bottoms,
            OutfitSlot::Shoes => self.shoes,
            OutfitSlot::Outerwear => self.outerwear,
        }
    }
}

pub struct OutfitService {
    outfits: Arc<dyn OutfitRepository>,
    wardrobe: Arc<dyn WardrobeRepository>,
    model: Option<Arc<dyn ChatModel>>,
}

impl OutfitService {
    pub fn new(outfits: Arc<dyn OutfitRepository>, wardrobe: Arc<dyn WardrobeRepository>) -> Self {
        Self {
            outfits,
            wardrobe,
            model: None,
        }
    }

    /// Enable AI generation.
    pub fn with_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Persist a user-composed outfit.
    pub async fn create(&self, draft: OutfitDraft) -> Result<Outfit, OutfitError> {
        if draft.items.is_empty() {
            return Err(OutfitError::EmptyDraft);
        }
        let outfit = Outfit {
            id: self.unique_id().await?,
            name: non_empty_or(draft.name, "Unnamed Outfit"),
            occasion: non_empty_or(draft.occasion, "casual"),
            items: draft.items,
            created_at: Utc::now(),
            notes: draft.notes,
            reasoning: None,
            is_ai_generated: false,
        };
        self.outfits.append(&outfit).await?;
        info!(name = %outfit.name, "outfit saved");
        Ok(outfit)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, OutfitError> {
        Ok(self.outfits.remove(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Outfit>, OutfitError> {
        Ok(self.outfits.list().await?)
    }

    /// Wholesale collection replacement for the `update collection` action.
    pub async fn replace_all(
        &self,
        outfits: &[Outfit],
        expected_version: Option<u64>,
    ) -> Result<u64, OutfitError> {
        Ok(self.outfits.replace_all(outfits, expected_version).await?)
    }

    /// Ask the chat model to fill the outfit slots from the wardrobe.
    ///
    /// The model picks by index from per-slot candidate lists; out-of-range
    /// picks degrade to empty slots, and a reply that fills nothing is an
    /// error. No retries: the user simply asks again.
    pub async fn generate(&self, occasion: &str, hints: Option<&str>) -> Result<Outfit, OutfitError> {
        let model = self
            .model
            .as_ref()
            .ok_or(OutfitError::GeneratorUnavailable)?;

        let wardrobe = self.wardrobe.list().await?;
        let candidates = SlotCandidates::from_wardrobe(&wardrobe);
        if candidates.is_empty() {
            return Err(OutfitError::EmptyWardrobe);
        }

        let prompt = build_prompt(occasion, hints, &candidates);
        let reply = model.complete(SYSTEM_PROMPT, &prompt).await?;
        let parsed = parse_reply(&reply)?;

        let items = candidates.resolve(&parsed.items);
        if items.is_empty() {
            return Err(OutfitError::MalformedReply(
                "reply filled no outfit slots".to_string(),
            ));
        }

        let outfit = Outfit {
            id: self.unique_id().await?,
            name: parsed
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("{occasion} outfit")),
            occasion: non_empty_or(occasion.to_string(), "casual"),
            items,
            created_at: Utc::now(),
            notes: None,
            reasoning: parsed.reasoning,
            is_ai_generated: true,
        };
        self.outfits.append(&outfit).await?;
        info!(name = %outfit.name, "AI outfit generated");
        Ok(outfit)
    }

    /// Time-derived id, nudged forward when two creations share a millisecond.
    async fn unique_id(&self) -> Result<String> {
        let taken: HashSet<String> = self
            .outfits
            .list()
            .await?
            .into_iter()
            .map(|outfit| outfit.id)
            .collect();
        let mut millis = Utc::now().timestamp_millis();
        while taken.contains(&millis.to_string()) {
            millis += 1;
        }
        Ok(millis.to_string())
    }
}

/// Wardrobe items eligible for each outfit slot, in stored order.
struct SlotCandidates<'a> {
    tops: Vec<&'a WardrobeItem>,
    bottoms: Vec<&'a WardrobeItem>,
    shoes: Vec<&'a WardrobeItem>,
    outerwear: Vec<&'a WardrobeItem>,
}

impl<'a> SlotCandidates<'a> {
    fn from_wardrobe(wardrobe: &'a [WardrobeItem]) -> Self {
        let pick = |category: Category| {
            wardrobe
                .iter()
                .filter(|item| item.category == category)
                .collect::<Vec<_>>()
        };
        Self {
            tops: pick(Category::Tops),
            bottoms: pick(Category::Bottoms),
            shoes: pick(Category::Shoes),
            outerwear: pick(Category::Outerwear),
        }
    }

    fn get(&self, slot: OutfitSlot) -> &[&'a WardrobeItem] {
        match slot {
            OutfitSlot::Tops => &self.tops,
            OutfitSlot::Bottoms => &self.bottoms,
            OutfitSlot::Shoes => &self.shoes,
            OutfitSlot::Outerwear => &self.outerwear,
        }
    }

    fn is_empty(&self) -> bool {
        OutfitSlot::ALL.into_iter().all(|slot| self.get(slot).is_empty())
    }

    /// Map index picks back to items; out-of-range picks become empty slots.
    fn resolve(&self, picks: &GeneratedPicks) -> OutfitItems {
        let mut items = OutfitItems::default();
        for slot in OutfitSlot::ALL {
            if let Some(index) = picks.get(slot) {
                match self.get(slot).get(index) {
                    Some(item) => items.set(slot, Some((*item).clone())),
                    None => warn!("generator picked out-of-range index {index} for {slot}"),
                }
            }
        }
        items
    }
}

fn build_prompt(occasion: &str, hints: Option<&str>, candidates: &SlotCandidates<'_>) -> String {
    let mut prompt = format!("Compose an outfit for this occasion: {occasion}.\n");
    if let Some(hints) = hints {
        prompt.push_str(&format!("Additional preferences: {hints}.\n"));
    }
    prompt.push_str("\nAvailable wardrobe items per slot:\n");
    for slot in OutfitSlot::ALL {
        prompt.push_str(&format!("{slot}:\n"));
        let items = candidates.get(slot);
        if items.is_empty() {
            prompt.push_str("  (none available)\n");
        }
        for (index, item) in items.iter().enumerate() {
            prompt.push_str(&format!("  {index}. {}\n", describe(item)));
        }
    }
    prompt.push_str(
        "\nPick at most one item per slot by its index; use null for a slot you leave empty \
         (a slot with no available items must be null). Reply with exactly this JSON shape:\n\
         {\"name\": \"...\", \"reasoning\": \"...\", \
         \"items\": {\"tops\": 0, \"bottoms\": null, \"shoes\": 1, \"outerwear\": null}}",
    );
    prompt
}

fn describe(item: &WardrobeItem) -> String {
    let mut parts = vec![item.product.title.clone()];
    if !item.product.brand.is_empty() {
        parts.push(item.product.brand.clone());
    }
    if !item.product.price.is_empty() {
        parts.push(item.product.price.clone());
    }
    parts.join(" - ")
}

/// Parse the model reply: strip code fences, then fall back to the
/// outermost brace span when the model wrapped the JSON in prose.
fn parse_reply(reply: &str) -> Result<GeneratedReply, OutfitError> {
    let stripped = strip_code_fences(reply);
    if let Ok(parsed) = serde_json::from_str(stripped) {
        return Ok(parsed);
    }
    let braced = stripped
        .find('{')
        .and_then(|start| stripped.rfind('}').map(|end| &stripped[start..=end]))
        .ok_or_else(|| OutfitError::MalformedReply("no JSON object in reply".to_string()))?;
    serde_json::from_str(braced).map_err(|e| OutfitError::MalformedReply(e.to_string()))
}

fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}
