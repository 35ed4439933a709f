//! Two-player Bayesian skill rating
//!
//! Each document carries a Gaussian belief `(mu, sigma)` over its latent
//! skill. A synthetic match between two documents is decided by their raw
//! skill scores and both beliefs are updated with the TrueSkill rule for a
//! single 1-vs-1 game without draws.

use crate::config::RatingConfig;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub mu: f64,
    pub sigma: f64,
}

impl Rating {
    pub fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }

    /// Lower bound that the true skill exceeds with ~99% confidence
    pub fn conservative(&self) -> f64 {
        self.mu - 3.0 * self.sigma
    }
}

/// Which side of a match won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    First,
    Second,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::First => write!(f, "CV1"),
            Outcome::Second => write!(f, "CV2"),
        }
    }
}

pub struct RatingRefiner {
    config: RatingConfig,
}

impl Default for RatingRefiner {
    fn default() -> Self {
        Self::new(RatingConfig::default())
    }
}

impl RatingRefiner {
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    /// Starting belief for a document: centred on its skill score
    pub fn initial_rating(&self, skill_score: u32) -> Rating {
        Rating::new(skill_score as f64, self.config.initial_sigma)
    }

    /// Play one match. A wins whenever `score_a >= score_b`, so exact ties
    /// go to the first document.
    pub fn refine(
        &self,
        rating_a: Rating,
        rating_b: Rating,
        score_a: u32,
        score_b: u32,
    ) -> (Outcome, Rating, Rating) {
        if score_a >= score_b {
            let (a, b) = self.rate_1vs1(rating_a, rating_b);
            (Outcome::First, a, b)
        } else {
            let (b, a) = self.rate_1vs1(rating_b, rating_a);
            (Outcome::Second, a, b)
        }
    }

    /// Round robin over every unordered pair `(i, j)`, `i < j`, in index
    /// order. Later matches see the ratings produced by earlier ones.
    pub fn refine_all(&self, ratings: &[Rating], scores: &[u32]) -> Vec<Rating> {
        debug_assert_eq!(ratings.len(), scores.len(), "one skill score per rating");
        let mut ratings = ratings.to_vec();
        let n = ratings.len().min(scores.len());

        for i in 0..n {
            for j in (i + 1)..n {
                let (_, a, b) = self.refine(ratings[i], ratings[j], scores[i], scores[j]);
                ratings[i] = a;
                ratings[j] = b;
            }
        }

        ratings
    }

    fn rate_1vs1(&self, winner: Rating, loser: Rating) -> (Rating, Rating) {
        let tau_sq = self.config.tau.powi(2);
        let winner_var = winner.sigma.powi(2) + tau_sq;
        let loser_var = loser.sigma.powi(2) + tau_sq;

        let c_sq = 2.0 * self.config.beta.powi(2) + winner_var + loser_var;
        let c = c_sq.sqrt();
        let t = (winner.mu - loser.mu) / c;

        let (v, w) = truncation_factors(t);

        let new_winner = Rating::new(
            winner.mu + winner_var / c * v,
            self.shrink(winner.sigma, winner_var, c_sq, w),
        );
        let new_loser = Rating::new(
            loser.mu - loser_var / c * v,
            self.shrink(loser.sigma, loser_var, c_sq, w),
        );

        (new_winner, new_loser)
    }

    /// Posterior sigma. Tau inflates the prior variance before the update, so
    /// an expected win can come out wider than it went in; the result is
    /// capped at the prior sigma and then held above the floor.
    fn shrink(&self, prior_sigma: f64, variance: f64, c_sq: f64, w: f64) -> f64 {
        let factor = (1.0 - variance / c_sq * w).max(0.0);
        (variance * factor)
            .sqrt()
            .min(prior_sigma)
            .max(self.config.sigma_floor)
    }
}

/// Mean and variance corrections for a win with zero draw margin.
/// Deep upsets underflow the CDF; the asymptotic limits are used there.
fn truncation_factors(t: f64) -> (f64, f64) {
    let denom = cdf(t);
    if denom > 0.0 {
        let v = pdf(t) / denom;
        (v, v * (v + t))
    } else {
        let w = if t < 0.0 { 1.0 } else { 0.0 };
        (-t, w)
    }
}

fn pdf(x: f64) -> f64 {
    (-x * x / 2.0).exp() / (2.0 * PI).sqrt()
}

fn cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Complementary error function, Chebyshev fit with relative error < 1.2e-7
fn erfc(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 10] = [
        -1.26551223, 1.00002368, 0.37409196, 0.09678418, -0.18628806,
        0.27886807, -1.13520398, 1.48851587, -0.82215223, 0.17087277,
    ];

    let z = x.abs();
    let t = 1.0 / (1.0 + z / 2.0);
    let poly = COEFFICIENTS.iter().rev().fold(0.0, |acc, &c| c + t * acc);
    let r = t * (-z * z + poly).exp();

    if x < 0.0 {
        2.0 - r
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refiner() -> RatingRefiner {
        RatingRefiner::default()
    }

    #[test]
    fn test_cdf_reference_points() {
        assert!((cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((cdf(1.0) - 0.841_344_746).abs() < 1e-6);
        assert!((cdf(-1.96) - 0.024_997_895).abs() < 1e-6);
    }

    #[test]
    fn test_standard_first_match() {
        // Fresh players at (25, 25/3): the classic 29.205 / 20.795 update
        let r = Rating::new(25.0, 25.0 / 3.0);
        let (outcome, a, b) = refiner().refine(r, r, 1, 0);

        assert_eq!(outcome, Outcome::First);
        assert!((a.mu - 29.205).abs() < 1e-3);
        assert!((b.mu - 20.795).abs() < 1e-3);
        assert!((a.sigma - 7.195).abs() < 1e-3);
        assert!((b.sigma - 7.195).abs() < 1e-3);
    }

    #[test]
    fn test_tie_goes_to_first() {
        let r = refiner();
        let a = r.initial_rating(3);
        let b = r.initial_rating(3);

        let (outcome, new_a, new_b) = r.refine(a, b, 3, 3);
        assert_eq!(outcome, Outcome::First);
        assert_eq!(outcome.to_string(), "CV1");
        assert!(new_a.mu > a.mu);
        assert!(new_b.mu < b.mu);
    }

    #[test]
    fn test_second_wins_on_higher_score() {
        let r = refiner();
        let a = r.initial_rating(1);
        let b = r.initial_rating(4);

        let (outcome, new_a, new_b) = r.refine(a, b, 1, 4);
        assert_eq!(outcome, Outcome::Second);
        assert!(new_b.mu > b.mu);
        assert!(new_a.mu < a.mu);
    }

    #[test]
    fn test_sigma_shrinks_but_respects_floor() {
        let r = refiner();
        let (_, a, b) = r.refine(r.initial_rating(2), r.initial_rating(0), 2, 0);
        assert!(a.sigma < 25.0 / 3.0);
        assert!(b.sigma < 25.0 / 3.0);

        let floor = RatingRefiner::new(RatingConfig {
            sigma_floor: 5.0,
            ..RatingConfig::default()
        });
        let mut ratings = vec![floor.initial_rating(1), floor.initial_rating(0)];
        for _ in 0..50 {
            ratings = floor.refine_all(&ratings, &[1, 0]);
        }
        assert!(ratings.iter().all(|rating| rating.sigma >= 5.0));
        assert!(ratings.iter().any(|rating| rating.sigma == 5.0));
    }

    #[test]
    fn test_surprise_moves_mu_further() {
        let r = refiner();
        let strong = Rating::new(30.0, 25.0 / 3.0);
        let weak = Rating::new(10.0, 25.0 / 3.0);

        let (_, expected_winner, _) = r.refine(strong, weak, 1, 0);
        let (_, _, upset_winner) = r.refine(strong, weak, 0, 1);

        assert!(upset_winner.mu - weak.mu > expected_winner.mu - strong.mu);
    }

    #[test]
    fn test_extreme_upset_is_finite() {
        let r = refiner();
        let (_, a, b) = r.refine(Rating::new(-500.0, 1.0), Rating::new(500.0, 1.0), 1, 0);

        assert!(a.mu.is_finite() && a.sigma.is_finite());
        assert!(b.mu.is_finite() && b.sigma.is_finite());
        assert!(a.mu > -500.0);
        assert!(b.mu < 500.0);
    }

    #[test]
    fn test_round_robin_respects_scores() {
        let r = refiner();
        let scores = [5, 5, 2];
        let initial: Vec<Rating> = scores.iter().map(|&s| r.initial_rating(s)).collect();

        let refined = r.refine_all(&initial, &scores);
        assert!(refined[0].mu > refined[2].mu);
        assert!(refined[1].mu > refined[2].mu);
        assert!(refined[0].mu >= refined[1].mu);
    }

    #[test]
    fn test_round_robin_is_deterministic() {
        let r = refiner();
        let scores = [0, 1, 4, 4, 2];
        let initial: Vec<Rating> = scores.iter().map(|&s| r.initial_rating(s)).collect();

        assert_eq!(r.refine_all(&initial, &scores), r.refine_all(&initial, &scores));
    }

    #[test]
    fn test_round_robin_skips_small_batches() {
        let r = refiner();
        let single = vec![r.initial_rating(3)];
        assert_eq!(r.refine_all(&single, &[3]), single);
        assert!(r.refine_all(&[], &[]).is_empty());
    }

    #[test]
    #[should_panic(expected = "one skill score per rating")]
    fn test_round_robin_mismatched_lengths() {
        let r = refiner();
        r.refine_all(&[r.initial_rating(1), r.initial_rating(2)], &[1]);
    }

    #[test]
    fn test_expected_win_never_widens_sigma() {
        let r = refiner();
        let favourite = Rating::new(40.0, 1.0);
        let underdog = Rating::new(0.0, 1.0);

        let (outcome, a, b) = r.refine(favourite, underdog, 1, 0);
        assert_eq!(outcome, Outcome::First);
        assert!(a.sigma <= favourite.sigma);
        assert!(b.sigma <= underdog.sigma);
        assert!(a.mu >= favourite.mu);
    }

    #[test]
    fn test_round_robin_sigma_is_non_increasing() {
        let r = refiner();
        let scores = [12, 0, 7, 0, 12];
        let mut ratings: Vec<Rating> = scores.iter().map(|&s| r.initial_rating(s)).collect();

        for _ in 0..5 {
            let next = r.refine_all(&ratings, &scores);
            for (before, after) in ratings.iter().zip(&next) {
                assert!(after.sigma <= before.sigma);
            }
            ratings = next;
        }
    }

    #[test]
    fn test_conservative_estimate() {
        assert_eq!(Rating::new(25.0, 2.0).conservative(), 19.0);
    }
}
