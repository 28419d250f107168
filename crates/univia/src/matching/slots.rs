use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{CampusSetting, Money, ProfileField, Slot, StudentProfile};

/// Result of applying one answer to the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub slot: Slot,
    /// Whether the raw value parsed.
    pub applied: bool,
    /// Profile field whose value actually changed, if any.
    pub changed_field: Option<ProfileField>,
}

/// Tracks which information slots were already solicited.
#[derive(Debug, Clone, Default)]
pub struct SlotTracker {
    asked: BTreeSet<Slot>,
}

impl SlotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asked(&self) -> impl Iterator<Item = Slot> + '_ {
        self.asked.iter().copied()
    }

    pub fn is_asked(&self, slot: Slot) -> bool {
        self.asked.contains(&slot)
    }

    pub fn mark_asked(&mut self, slot: Slot) {
        self.asked.insert(slot);
    }

    pub fn pending_questions(&self, max_count: usize) -> Vec<Slot> {
        Slot::PRIORITY
            .into_iter()
            .filter(|slot| !self.asked.contains(slot))
            .take(max_count)
            .collect()
    }

    /// Parses `raw` for `slot` and writes it into the profile.
    ///
    /// The slot is marked asked whether or not the value parses, so it is never re-asked.
    pub fn apply_answer(
        &mut self,
        profile: &mut StudentProfile,
        slot: Slot,
        raw: &str,
    ) -> AnswerOutcome {
        self.mark_asked(slot);

        let changed = match slot {
            Slot::Budget => parse_amount(raw).map(|amount| {
                let next = Some(Money::eur(amount));
                replace(&mut profile.budget.annual_total, next)
            }),
            Slot::Portfolio => parse_flag(raw)
                .map(|flag| replace(&mut profile.preferences.portfolio_ready, Some(flag))),
            Slot::LanguageTestPlan => {
                let plan = raw.trim();
                (!plan.is_empty()).then(|| {
                    replace(
                        &mut profile.academics.english.test_plan,
                        Some(plan.to_string()),
                    )
                })
            }
            Slot::CampusSetting => CampusSetting::parse(raw)
                .map(|setting| replace(&mut profile.preferences.campus_setting, Some(setting))),
            Slot::Accessibility => parse_flag(raw)
                .map(|flag| replace(&mut profile.constraints.accessibility, Some(flag))),
        };

        match changed {
            Some(changed) => AnswerOutcome {
                slot,
                applied: true,
                changed_field: changed.then(|| slot.field()),
            },
            None => {
                debug!(slot = slot.id(), raw, "ignoring unparseable answer");
                AnswerOutcome {
                    slot,
                    applied: false,
                    changed_field: None,
                }
            }
        }
    }
}

fn replace<T: PartialEq>(field: &mut Option<T>, next: Option<T>) -> bool {
    if *field == next {
        return false;
    }
    *field = next;
    true
}

const TRUTHY: [&str; 6] = ["yes", "y", "oui", "true", "vrai", "1"];
const FALSY: [&str; 6] = ["no", "n", "non", "false", "faux", "0"];

pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    let normalized = raw.trim().to_lowercase();
    if TRUTHY.contains(&normalized.as_str()) {
        Some(true)
    } else if FALSY.contains(&normalized.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Parses a budget such as `12000`, `12,000`, `12 500 €`, `12.000,50` or `12,5`.
///
/// A lone separator followed by exactly three-digit groups is a thousands
/// separator; otherwise it is the decimal mark. When both `,` and `.` appear,
/// the last one is the decimal mark.
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    let lowered = raw.trim().to_lowercase();
    let stripped = lowered
        .trim_end_matches("eur")
        .trim_end_matches("euros")
        .trim_end_matches("euro");
    let cleaned: String = stripped
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '€' | '$' | '£' | '_' | '\''))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    let canonical = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) => {
            let (grouping, decimal) = if comma > dot { ('.', ',') } else { (',', '.') };
            cleaned
                .chars()
                .filter(|c| *c != grouping)
                .map(|c| if c == decimal { '.' } else { c })
                .collect()
        }
        (Some(_), None) => resolve_single_separator(&cleaned, ','),
        (None, Some(_)) => resolve_single_separator(&cleaned, '.'),
        (None, None) => cleaned,
    };

    canonical
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
}

fn resolve_single_separator(value: &str, separator: char) -> String {
    let groups: Vec<&str> = value.split(separator).collect();
    let grouped_thousands = groups.len() > 1
        && !groups[0].is_empty()
        && groups[1..]
            .iter()
            .all(|group| group.len() == 3 && group.chars().all(|c| c.is_ascii_digit()));

    if grouped_thousands {
        groups.concat()
    } else if groups.len() == 2 {
        value.replace(separator, ".")
    } else {
        // Repeated separators that are not thousands groups cannot be a number.
        String::new()
    }
}
