use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::matching::Slot;

/// Slot plus the text shown to the student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub slot: Slot,
    pub text: String,
}

/// Presentation text for each slot. Kept outside the engine so wording can change freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPrompts {
    texts: BTreeMap<Slot, String>,
}

impl SlotPrompts {
    pub fn with_override(mut self, slot: Slot, text: impl Into<String>) -> Self {
        self.texts.insert(slot, text.into());
        self
    }

    /// Falls back to the slot id when no text is registered.
    pub fn text(&self, slot: Slot) -> String {
        self.texts
            .get(&slot)
            .cloned()
            .unwrap_or_else(|| slot.id().to_string())
    }

    pub fn question(&self, slot: Slot) -> Question {
        Question {
            slot,
            text: self.text(slot),
        }
    }
}

impl Default for SlotPrompts {
    fn default() -> Self {
        let texts = [
            (
                Slot::Budget,
                "What total yearly budget (tuition, housing and living costs) are you aiming for, in EUR?",
            ),
            (
                Slot::Portfolio,
                "Will you have a portfolio ready before the UCAS deadline?",
            ),
            (
                Slot::LanguageTestPlan,
                "Do you have a plan for the IELTS (target date, target score)?",
            ),
            (
                Slot::CampusSetting,
                "Do you prefer an urban, suburban or rural campus?",
            ),
            (
                Slot::Accessibility,
                "Do you have accessibility or reduced-mobility needs we should take into account?",
            ),
        ]
        .into_iter()
        .map(|(slot, text)| (slot, text.to_string()))
        .collect();

        Self { texts }
    }
}
