//! Session state and its unidirectional update cycle.
//!
//! Everything a UI surface tracks between renders lives in one explicit
//! [`SessionState`] value; the only way to change it is to run an action
//! through [`reduce`]. The reducer is pure, so every transition is
//! testable without a UI and no ambient globals exist to drift out of
//! sync. Collection caches inside the state are transient copies; the
//! store remains the owner and the caches refresh when a
//! `CollectionChanged` notification (or an explicit reload) delivers new
//! data via the `*Loaded` actions.

use serde::{Deserialize, Serialize};

use crate::domain::item::{Category, WardrobeItem};
use crate::domain::outfit::{Outfit, OutfitItems, OutfitSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Wardrobe,
    Outfits,
    Add,
}

/// Wardrobe category filter; `All` shows every bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub current_tab: Tab,
    pub category_filter: CategoryFilter,
    pub search_query: String,
    /// Transient cache of the wardrobe collection.
    pub wardrobe: Vec<WardrobeItem>,
    /// Transient cache of the outfits collection.
    pub outfits: Vec<Outfit>,
    /// Slot selection in progress; `None` when no outfit is being composed.
    pub outfit_draft: Option<OutfitItems>,
}

#[derive(Debug, Clone)]
pub enum SessionAction {
    SwitchTab(Tab),
    SetCategoryFilter(CategoryFilter),
    SetSearchQuery(String),
    WardrobeLoaded(Vec<WardrobeItem>),
    OutfitsLoaded(Vec<Outfit>),
    BeginOutfitDraft,
    SelectDraftItem { slot: OutfitSlot, item: WardrobeItem },
    ClearDraftSlot(OutfitSlot),
    CancelOutfitDraft,
}

/// Pure state transition: current state + action = next state.
pub fn reduce(mut state: SessionState, action: SessionAction) -> SessionState {
    match action {
        SessionAction::SwitchTab(tab) => state.current_tab = tab,
        SessionAction::SetCategoryFilter(filter) => state.category_filter = filter,
        SessionAction::SetSearchQuery(query) => state.search_query = query,
        SessionAction::WardrobeLoaded(items) => state.wardrobe = items,
        SessionAction::OutfitsLoaded(outfits) => state.outfits = outfits,
        SessionAction::BeginOutfitDraft => state.outfit_draft = Some(OutfitItems::default()),
        SessionAction::SelectDraftItem { slot, item } => {
            let mut draft = state.outfit_draft.take().unwrap_or_default();
            draft.set(slot, Some(item));
            state.outfit_draft = Some(draft);
        }
        SessionAction::ClearDraftSlot(slot) => {
            if let Some(draft) = &mut state.outfit_draft {
                draft.set(slot, None);
            }
        }
        SessionAction::CancelOutfitDraft => state.outfit_draft = None,
    }
    state
}

impl SessionState {
    /// Wardrobe items surviving the active category and search filters,
    /// in stored order.
    pub fn visible_items(&self) -> Vec<&WardrobeItem> {
        let query = self.search_query.to_lowercase();
        self.wardrobe
            .iter()
            .filter(|item| match self.category_filter {
                CategoryFilter::All => true,
                CategoryFilter::Only(category) => item.category == category,
            })
            .filter(|item| query.is_empty() || item.search_text().contains(&query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::ProductInfo;
    use chrono::Utc;

    fn item(title: &str, category: Category) -> WardrobeItem {
        WardrobeItem {
            product: ProductInfo {
                title: title.to_string(),
                ..ProductInfo::empty("https://shop.example/p")
            },
            category,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn filters_compose_over_the_cached_wardrobe() {
        let state = SessionState {
            wardrobe: vec![
                item("Wool sweater", Category::Tops),
                item("Linen shirt", Category::Tops),
                item("Chelsea boot", Category::Shoes),
            ],
            category_filter: CategoryFilter::Only(Category::Tops),
            search_query: "linen".to_string(),
            ..SessionState::default()
        };

        let visible = state.visible_items();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].product.title, "Linen shirt");
    }

    #[test]
    fn draft_selection_accumulates_and_cancels() {
        let state = SessionState::default();
        let state = reduce(state, SessionAction::BeginOutfitDraft);
        let state = reduce(
            state,
            SessionAction::SelectDraftItem {
                slot: OutfitSlot::Tops,
                item: item("Tee", Category::Tops),
            },
        );
        let state = reduce(
            state,
            SessionAction::SelectDraftItem {
                slot: OutfitSlot::Shoes,
                item: item("Sneaker", Category::Shoes),
            },
        );
        assert_eq!(state.outfit_draft.as_ref().unwrap().filled().count(), 2);

        let state = reduce(state, SessionAction::ClearDraftSlot(OutfitSlot::Tops));
        assert_eq!(state.outfit_draft.as_ref().unwrap().filled().count(), 1);

        let state = reduce(state, SessionAction::CancelOutfitDraft);
        assert!(state.outfit_draft.is_none());
    }

    #[test]
    fn tab_switches_do_not_disturb_other_state() {
        let state = SessionState {
            search_query: "boots".to_string(),
            ..SessionState::default()
        };
        let state = reduce(state, SessionAction::SwitchTab(Tab::Outfits));
        assert_eq!(state.current_tab, Tab::Outfits);
        assert_eq!(state.search_query, "boots");
    }
}
