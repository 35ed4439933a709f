//! Text processing and ranking module

pub mod document;
pub mod text_processor;
pub mod skill_scorer;
pub mod similarity;
pub mod rating;
pub mod leaderboard;
pub mod ranker;

pub use ranker::{LeaderboardEntry, RankBasis, RankingEngine, RankingReport};
pub use rating::{Outcome, Rating, RatingRefiner};
pub use similarity::{SimilarityEdge, SimilarityEngine};
pub use skill_scorer::{KeywordSet, SkillScorer};
