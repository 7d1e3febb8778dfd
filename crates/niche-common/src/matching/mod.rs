pub mod compatibility;
pub mod config;
pub mod dimensions;
pub mod distance;
pub mod engine;
pub mod normalize;
pub mod ranking;
pub mod result;
pub mod summary;
pub mod weights;

pub use compatibility::{CompatibilityResult, ReferenceProfile, score_compatibility};
pub use config::MatchConfig;
pub use dimensions::SkillDimension;
pub use distance::{cosine_similarity, weighted_distance};
pub use engine::{GithubSimilarity, SimilarityEngine};
pub use normalize::{DimensionStats, PopulationStats};
pub use ranking::{NEAR_TIE_BAND, compare_matches, rank_top_k};
pub use result::MatchResult;
pub use summary::MatchSummary;
pub use weights::SkillWeights;
