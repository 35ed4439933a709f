//! Ranking engine: scores, similarities, rating refinement and leaderboard
//! for one batch of CVs

use crate::config::Config;
use crate::error::Result;
use crate::processing::document::Document;
use crate::processing::leaderboard;
use crate::processing::rating::{Rating, RatingRefiner};
use crate::processing::similarity::{SimilarityEdge, SimilarityEngine};
use crate::processing::skill_scorer::{KeywordSet, SkillScorer};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

pub struct RankingEngine {
    similarity_engine: SimilarityEngine,
    refiner: RatingRefiner,
    compute_similarity: bool,
    refine_ratings: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingReport {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub similarities: Vec<SimilarityEdge>,
    pub keywords: Vec<String>,
    pub ranked_by: RankBasis,
    pub generated_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub skill_score: u32,
    pub mu: Option<f64>,
    pub sigma: Option<f64>,
    /// `mu - 3 * sigma`
    pub conservative: Option<f64>,
    pub matched_keywords: Vec<String>,
    pub word_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankBasis {
    SkillScore,
    Rating,
}

impl RankingEngine {
    pub fn new(config: &Config) -> Result<Self> {
        config.rating.validate()?;

        Ok(Self {
            similarity_engine: SimilarityEngine::new(),
            refiner: RatingRefiner::new(config.rating.clone()),
            compute_similarity: config.scoring.compute_similarity,
            refine_ratings: config.scoring.refine_ratings,
        })
    }

    pub fn with_similarity(mut self, enable: bool) -> Self {
        self.compute_similarity = enable;
        self
    }

    pub fn with_rating(mut self, enable: bool) -> Self {
        self.refine_ratings = enable;
        self
    }

    /// Rank `(name, text)` pairs against `keywords`.
    ///
    /// Repeated names are suffixed `#2`, `#3`, ... in input order so every
    /// entry and similarity edge stays addressable.
    ///
    /// Pairwise similarity and rating refinement need at least two documents
    /// and are skipped otherwise; scoring and the leaderboard always run.
    pub fn rank<N, T>(&self, documents: Vec<(N, T)>, keywords: &KeywordSet) -> Result<RankingReport>
    where
        N: Into<String>,
        T: Into<String>,
    {
        let start_time = Instant::now();

        let mut documents: Vec<Document> = documents
            .into_iter()
            .map(|(name, text)| Document::new(name, text))
            .collect();
        Self::disambiguate_names(&mut documents);

        info!("Ranking {} documents against {} keywords", documents.len(), keywords.len());

        let scorer = SkillScorer::new(keywords.clone())?;
        for doc in documents.iter_mut() {
            doc.skill_score = scorer.score(doc.content());
            doc.matched_keywords = scorer.matched_keywords(doc.content());
            debug!("{}: skill score {} ({:?})", doc.name, doc.skill_score, doc.matched_keywords);
        }

        let pairwise_ready = documents.len() >= 2;

        let similarities = if self.compute_similarity && pairwise_ready {
            self.similarity_engine.pairwise(&documents)
        } else {
            Vec::new()
        };
        debug!("Computed {} similarity edges", similarities.len());

        let refined = self.refine_ratings && pairwise_ready;
        if refined {
            let scores: Vec<u32> = documents.iter().map(|d| d.skill_score).collect();
            let initial: Vec<Rating> = scores
                .iter()
                .map(|&s| self.refiner.initial_rating(s))
                .collect();
            let ratings = self.refiner.refine_all(&initial, &scores);
            for (doc, rating) in documents.iter_mut().zip(ratings) {
                debug!("{}: mu {:.3}, sigma {:.3}", doc.name, rating.mu, rating.sigma);
                doc.rating = Some(rating);
            }
        }

        let ranked_by = if refined { RankBasis::Rating } else { RankBasis::SkillScore };
        let ranked = leaderboard::assemble(documents.iter().enumerate().map(|(idx, doc)| {
            let value = match doc.rating {
                Some(rating) if refined => rating.mu,
                _ => doc.skill_score as f64,
            };
            (idx, value)
        }));

        let leaderboard = ranked
            .into_iter()
            .map(|entry| {
                let doc = &documents[entry.id];
                LeaderboardEntry {
                    rank: entry.rank,
                    name: doc.name.clone(),
                    skill_score: doc.skill_score,
                    mu: doc.rating.map(|r| r.mu),
                    sigma: doc.rating.map(|r| r.sigma),
                    conservative: doc.rating.map(|r| r.conservative()),
                    matched_keywords: doc.matched_keywords.clone(),
                    word_count: doc.metadata.word_count,
                }
            })
            .collect();

        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        info!("Ranking completed in {}ms", processing_time_ms);

        Ok(RankingReport {
            leaderboard,
            similarities,
            keywords: keywords.terms().to_vec(),
            ranked_by,
            generated_at: Utc::now(),
            processing_time_ms,
        })
    }

    fn disambiguate_names(documents: &mut [Document]) {
        let mut taken: HashSet<String> = HashSet::new();
        for doc in documents.iter_mut() {
            if taken.insert(doc.name.clone()) {
                continue;
            }
            let mut copy = 2;
            let renamed = loop {
                let candidate = format!("{}#{}", doc.name, copy);
                if taken.insert(candidate.clone()) {
                    break candidate;
                }
                copy += 1;
            };
            warn!("Duplicate document name {}; ranking it as {}", doc.name, renamed);
            doc.name = renamed;
        }
    }
}

impl RankingReport {
    pub fn entry(&self, name: &str) -> Option<&LeaderboardEntry> {
        self.leaderboard.iter().find(|e| e.name == name)
    }

    pub fn similarity(&self, first: &str, second: &str) -> Option<f64> {
        self.similarities
            .iter()
            .find(|e| {
                (e.first == first && e.second == second) || (e.first == second && e.second == first)
            })
            .map(|e| e.similarity)
    }
}
