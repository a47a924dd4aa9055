//! Mystery box progress kept across page loads.

use std::collections::BTreeMap;

use folio_engine::KeyValueStore;
use serde::{Deserialize, Serialize};

use crate::mystery_box::BoxState;

pub const STORAGE_KEY: &str = "portfolioMysteryBoxStates";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredBoxState {
    Inactive,
    Active,
    Completed,
}

impl From<BoxState> for StoredBoxState {
    fn from(state: BoxState) -> Self {
        match state {
            BoxState::Armed => StoredBoxState::Inactive,
            BoxState::Hit => StoredBoxState::Active,
            BoxState::Emptied => StoredBoxState::Completed,
        }
    }
}

impl StoredBoxState {
    /// State a box takes on when the page loads. A box whose collectible was
    /// never picked up is armed again, since the collectible is not saved.
    pub fn restored(self) -> BoxState {
        match self {
            StoredBoxState::Completed => BoxState::Emptied,
            StoredBoxState::Inactive | StoredBoxState::Active => BoxState::Armed,
        }
    }
}

/// Box id → stored state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxStates {
    states: BTreeMap<String, StoredBoxState>,
}

impl BoxStates {
    /// Read the saved map. Missing or unreadable data yields an empty map;
    /// entries with unknown values are skipped.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(raw) = store.get(STORAGE_KEY) else {
            return Self::default();
        };
        let entries: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("ignoring saved box states: {}", e);
                return Self::default();
            }
        };
        let states = entries
            .into_iter()
            .filter_map(|(id, value)| match serde_json::from_value(value) {
                Ok(state) => Some((id, state)),
                Err(_) => {
                    log::warn!("ignoring saved state for box '{}'", id);
                    None
                }
            })
            .collect();
        Self { states }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(&self.states) {
            Ok(json) => store.set(STORAGE_KEY, &json),
            Err(e) => log::warn!("could not save box states: {}", e),
        }
    }

    pub fn get(&self, id: &str) -> Option<StoredBoxState> {
        self.states.get(id).copied()
    }

    pub fn set(&mut self, id: &str, state: StoredBoxState) {
        self.states.insert(id.to_string(), state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Forget all progress, in memory and in the store.
    pub fn clear(&mut self, store: &mut dyn KeyValueStore) {
        self.states.clear();
        store.remove(STORAGE_KEY);
    }
}
