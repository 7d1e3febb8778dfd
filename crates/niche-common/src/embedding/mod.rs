//! Raw-vector similarity (repository / profile embeddings), independent of the
//! four-dimension skill schema.

pub mod ranking;
pub mod similarity;
pub mod value;

pub use ranking::{
    EmbeddingAggregation, EmbeddingMatch, EmbeddingRankOptions, EmbeddingRanking, rank_candidates,
};
pub use similarity::{cosine_similarity, github_similarity_for};
pub use value::{EmbeddingRow, EmbeddingValue};
