use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::SkillVector;

/// スキルベクトルの各次元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SkillDimension {
    SystemsInfrastructure,
    TheoryStatisticsMl,
    Product,
    GithubSimilarity,
}

impl SkillDimension {
    pub const ALL: [SkillDimension; 4] = [
        SkillDimension::SystemsInfrastructure,
        SkillDimension::TheoryStatisticsMl,
        SkillDimension::Product,
        SkillDimension::GithubSimilarity,
    ];

    /// Dimensions z-scored against the population. `github_similarity` is
    /// already on a `[0, 1]` scale and passes through untouched.
    pub const ACADEMIC: [SkillDimension; 3] = [
        SkillDimension::SystemsInfrastructure,
        SkillDimension::TheoryStatisticsMl,
        SkillDimension::Product,
    ];

    pub fn is_academic(self) -> bool {
        !matches!(self, SkillDimension::GithubSimilarity)
    }
}

impl SkillVector {
    pub fn get(&self, dimension: SkillDimension) -> f64 {
        match dimension {
            SkillDimension::SystemsInfrastructure => self.systems_infrastructure,
            SkillDimension::TheoryStatisticsMl => self.theory_statistics_ml,
            SkillDimension::Product => self.product,
            SkillDimension::GithubSimilarity => self.github_similarity,
        }
    }

    pub fn set(&mut self, dimension: SkillDimension, value: f64) {
        match dimension {
            SkillDimension::SystemsInfrastructure => self.systems_infrastructure = value,
            SkillDimension::TheoryStatisticsMl => self.theory_statistics_ml = value,
            SkillDimension::Product => self.product = value,
            SkillDimension::GithubSimilarity => self.github_similarity = value,
        }
    }

    /// True when any academic score is strictly positive.
    pub fn has_academic_data(&self) -> bool {
        SkillDimension::ACADEMIC
            .iter()
            .any(|dimension| self.get(*dimension) > 0.0)
    }

    /// Element-wise `self - other`.
    pub fn difference(&self, other: &SkillVector) -> SkillVector {
        let mut out = SkillVector::default();
        for dimension in SkillDimension::ALL {
            out.set(dimension, self.get(dimension) - other.get(dimension));
        }
        out
    }
}
