use serde::Serialize;

use super::dimensions::SkillDimension;
use crate::{CandidateRecord, SkillVector};

/// 母集団の平均と標準偏差（N で割る母標準偏差）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DimensionStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl DimensionStats {
    fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean,
            std_dev: variance.sqrt(),
        }
    }

    /// z-score when the spread is positive, otherwise the raw value.
    pub fn standardize(&self, value: f64) -> f64 {
        if self.std_dev > 0.0 {
            (value - self.mean) / self.std_dev
        } else {
            value
        }
    }
}

/// Snapshot of the population statistics used for z-score normalization.
///
/// Computed from the full population at call time; nothing is cached across
/// population changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PopulationStats {
    pub size: usize,
    pub systems_infrastructure: DimensionStats,
    pub theory_statistics_ml: DimensionStats,
    pub product: DimensionStats,
}

impl PopulationStats {
    pub fn from_population(candidates: &[CandidateRecord]) -> Self {
        let column = |dimension: SkillDimension| -> Vec<f64> {
            candidates
                .iter()
                .map(|candidate| candidate.skills.get(dimension))
                .collect()
        };

        Self {
            size: candidates.len(),
            systems_infrastructure: DimensionStats::from_values(&column(
                SkillDimension::SystemsInfrastructure,
            )),
            theory_statistics_ml: DimensionStats::from_values(&column(
                SkillDimension::TheoryStatisticsMl,
            )),
            product: DimensionStats::from_values(&column(SkillDimension::Product)),
        }
    }

    /// `None` for `github_similarity`, which is never normalized.
    pub fn dimension(&self, dimension: SkillDimension) -> Option<DimensionStats> {
        match dimension {
            SkillDimension::SystemsInfrastructure => Some(self.systems_infrastructure),
            SkillDimension::TheoryStatisticsMl => Some(self.theory_statistics_ml),
            SkillDimension::Product => Some(self.product),
            SkillDimension::GithubSimilarity => None,
        }
    }

    pub fn normalize(&self, skills: &SkillVector) -> SkillVector {
        if self.size == 0 {
            return *skills;
        }

        let mut normalized = *skills;
        for dimension in SkillDimension::ACADEMIC {
            if let Some(stats) = self.dimension(dimension) {
                normalized.set(dimension, stats.standardize(skills.get(dimension)));
            }
        }
        normalized
    }
}
