use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIN_PARTICIPANTS: u8 = 1;
pub const MAX_PARTICIPANTS: u8 = 3;

fn default_participants() -> u8 {
    MIN_PARTICIPANTS
}

/// The user's current choices on the tour step of the registration form.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    #[serde(default)]
    pub selected: BTreeMap<String, bool>,
    #[serde(default)]
    pub early_bird: bool,
    #[serde(default, alias = "isReturning")]
    pub returning_client: bool,
    #[serde(default = "default_participants")]
    pub participant_count: u8,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            selected: BTreeMap::new(),
            early_bird: false,
            returning_client: false,
            participant_count: MIN_PARTICIPANTS,
        }
    }
}

impl SelectionState {
    pub fn set_participants(&mut self, count: u8) {
        self.participant_count = count.clamp(MIN_PARTICIPANTS, MAX_PARTICIPANTS);
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.get(key).copied().unwrap_or(false)
    }

    /// Returns a copy with the participant count forced into its domain.
    pub fn normalized(mut self) -> Self {
        self.set_participants(self.participant_count);
        self
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub base_price: f64,
    pub total_price: f64,
    pub participant_count: u8,
    /// True when the bundle price was used instead of a per-segment sum.
    pub bundle: bool,
}
