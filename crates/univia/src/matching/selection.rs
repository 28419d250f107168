use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::domain::{CampusSetting, OptionId, University};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub subset_size: usize,
    pub mid_tuition_from: f64,
    pub high_tuition_from: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            subset_size: 3,
            mid_tuition_from: 22_000.0,
            high_tuition_from: 28_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Low,
    Mid,
    High,
}

impl PriceTier {
    /// Missing tuition is bucketed with the cheapest tier.
    pub fn for_tuition(tuition: Option<f64>, config: &SelectionConfig) -> Self {
        let tuition = tuition.unwrap_or(0.0);
        if tuition >= config.high_tuition_from {
            PriceTier::High
        } else if tuition >= config.mid_tuition_from {
            PriceTier::Mid
        } else {
            PriceTier::Low
        }
    }
}

/// Coarse diversity key: campus setting crossed with price tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiversityBucket {
    pub setting: Option<CampusSetting>,
    pub tier: PriceTier,
}

impl DiversityBucket {
    pub fn of(option: &University, config: &SelectionConfig) -> Self {
        Self {
            setting: option.campus.setting,
            tier: PriceTier::for_tuition(option.tuition(), config),
        }
    }
}

/// Greedy diversified pick over candidates already ranked best-first.
///
/// A candidate whose bucket was already taken is skipped unless only the final
/// slot is left; any remaining gap is filled from the ranked order.
pub fn diversified_pick(ranked: &[&University], k: usize, config: &SelectionConfig) -> Vec<OptionId> {
    let target = k.min(ranked.len());
    let mut selected: Vec<OptionId> = Vec::with_capacity(target);
    let mut buckets: HashSet<DiversityBucket> = HashSet::new();

    for option in ranked {
        if selected.len() == target {
            break;
        }
        let bucket = DiversityBucket::of(option, config);
        if buckets.contains(&bucket) && selected.len() + 1 < target {
            continue;
        }
        selected.push(option.id.clone());
        buckets.insert(bucket);
    }

    for option in ranked {
        if selected.len() == target {
            break;
        }
        if !selected.contains(&option.id) {
            selected.push(option.id.clone());
        }
    }

    selected
}

/// Swap of one active-subset member for a stronger outside option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsetReplacement {
    pub position: usize,
    pub removed: OptionId,
    pub added: OptionId,
}

/// Chooses the lowest-scoring member and the highest-scoring candidate.
///
/// Ties keep the first entry encountered on both sides, so callers control
/// tie-breaking through the order of the slices.
pub fn plan_replacement(
    members: &[(OptionId, f64)],
    candidates: &[(OptionId, f64)],
) -> Option<SubsetReplacement> {
    let (position, (removed, _)) = members
        .iter()
        .enumerate()
        .fold(None::<(usize, &(OptionId, f64))>, |worst, (index, entry)| match worst {
            Some((_, current)) if entry.1 >= current.1 => worst,
            _ => Some((index, entry)),
        })?;

    let (added, _) = candidates.iter().fold(None::<&(OptionId, f64)>, |best, entry| match best {
        Some(current) if entry.1 <= current.1 => best,
        _ => Some(entry),
    })?;

    Some(SubsetReplacement {
        position,
        removed: removed.clone(),
        added: added.clone(),
    })
}
