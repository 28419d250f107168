use serde::{Deserialize, Serialize};

use super::engine::EngineError;
use super::fit::{Criterion, FitConfig};
use super::hybrid::BlendConfig;
use super::preference::PreferenceConfig;
use super::selection::SelectionConfig;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Every tunable constant of the engine in one place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fit: FitConfig,
    pub preference: PreferenceConfig,
    pub blend: BlendConfig,
    pub selection: SelectionConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        for criterion in Criterion::ALL {
            let weight = self.fit.weights.weight(criterion);
            if !weight.is_finite() || weight < 0.0 {
                return Err(EngineError::NegativeWeight { criterion, weight });
            }
        }

        let total = self.fit.weights.total();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(EngineError::InvalidWeights { total });
        }

        if self.selection.subset_size == 0 {
            return Err(EngineError::InvalidSubsetSize);
        }

        let blend = &self.blend;
        let bounded = |value: f64| (0.0..=1.0).contains(&value);
        if !bounded(blend.alpha_start)
            || !bounded(blend.alpha_floor)
            || blend.alpha_floor > blend.alpha_start
            || blend.alpha_step.is_nan()
            || blend.alpha_step < 0.0
        {
            return Err(EngineError::InvalidBlend {
                start: blend.alpha_start,
                step: blend.alpha_step,
                floor: blend.alpha_floor,
            });
        }

        Ok(())
    }
}
