use serde::{Deserialize, Serialize};

use super::dimensions::SkillDimension;
use crate::ValidationError;

/// 未指定の次元に適用される重み
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Per-dimension weights for the distance metric. Unset dimensions weigh
/// [`DEFAULT_WEIGHT`]; an explicit `0.0` removes the dimension from the metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillWeights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub systems_infrastructure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theory_statistics_ml: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_similarity: Option<f64>,
}

impl SkillWeights {
    pub fn uniform() -> Self {
        Self::default()
    }

    pub fn explicit(&self, dimension: SkillDimension) -> Option<f64> {
        match dimension {
            SkillDimension::SystemsInfrastructure => self.systems_infrastructure,
            SkillDimension::TheoryStatisticsMl => self.theory_statistics_ml,
            SkillDimension::Product => self.product,
            SkillDimension::GithubSimilarity => self.github_similarity,
        }
    }

    pub fn with(mut self, dimension: SkillDimension, weight: f64) -> Self {
        let slot = match dimension {
            SkillDimension::SystemsInfrastructure => &mut self.systems_infrastructure,
            SkillDimension::TheoryStatisticsMl => &mut self.theory_statistics_ml,
            SkillDimension::Product => &mut self.product,
            SkillDimension::GithubSimilarity => &mut self.github_similarity,
        };
        *slot = Some(weight);
        self
    }

    pub fn weight(&self, dimension: SkillDimension) -> f64 {
        self.explicit(dimension).unwrap_or(DEFAULT_WEIGHT)
    }

    pub fn total(&self) -> f64 {
        SkillDimension::ALL.iter().map(|d| self.weight(*d)).sum()
    }

    /// Rejects weight maps the distance metric cannot use.
    ///
    /// Negative or non-finite weights are invalid input; a map whose weights
    /// sum to zero would divide by zero and is a configuration error.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for dimension in SkillDimension::ALL {
            if let Some(weight) = self.explicit(dimension) {
                if !weight.is_finite() || weight < 0.0 {
                    return Err(ValidationError::invalid(format!(
                        "weight for {dimension} must be a finite, non-negative number"
                    )));
                }
            }
        }

        if self.total() <= 0.0 {
            return Err(ValidationError::configuration(
                "at least one skill weight must be positive",
            ));
        }

        Ok(())
    }
}
