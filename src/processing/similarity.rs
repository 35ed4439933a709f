//! Pairwise TF-IDF cosine similarity

use crate::processing::document::Document;
use crate::processing::text_processor::TextProcessor;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Similarity between two documents of a batch; `first` is the one listed
/// earlier in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEdge {
    pub first: String,
    pub second: String,
    pub similarity: f64,
}

/// TF-IDF vectorizer fitted on exactly the two texts being compared
pub struct SimilarityEngine {
    processor: TextProcessor,
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityEngine {
    pub fn new() -> Self {
        Self {
            processor: TextProcessor::new(),
        }
    }

    /// Cosine similarity of the two texts' TF-IDF vectors, in [0, 1].
    ///
    /// Empty or token-free input, or texts with no shared term, give 0.0.
    pub fn similarity(&self, text1: &str, text2: &str) -> f64 {
        let counts1 = self.processor.term_counts(text1);
        let counts2 = self.processor.term_counts(text2);

        if counts1.is_empty() || counts2.is_empty() {
            return 0.0;
        }
        if counts1 == counts2 {
            return 1.0;
        }

        let vocabulary: BTreeSet<&String> = counts1.keys().chain(counts2.keys()).collect();
        let weights1 = Self::tfidf_vector(&counts1, &counts2, &vocabulary);
        let weights2 = Self::tfidf_vector(&counts2, &counts1, &vocabulary);

        Self::cosine(&weights1, &weights2)
    }

    /// Similarity of every unordered pair, in input index order
    pub fn pairwise(&self, documents: &[Document]) -> Vec<SimilarityEdge> {
        let mut edges = Vec::new();
        for i in 0..documents.len() {
            for j in (i + 1)..documents.len() {
                edges.push(SimilarityEdge {
                    first: documents[i].name.clone(),
                    second: documents[j].name.clone(),
                    similarity: self.similarity(documents[i].content(), documents[j].content()),
                });
            }
        }
        edges
    }

    fn tfidf_vector(
        own: &BTreeMap<String, usize>,
        other: &BTreeMap<String, usize>,
        vocabulary: &BTreeSet<&String>,
    ) -> Vec<f64> {
        vocabulary
            .iter()
            .map(|term| {
                let tf = own.get(*term).copied().unwrap_or(0) as f64;
                let df = own.contains_key(*term) as usize + other.contains_key(*term) as usize;
                tf * Self::smoothed_idf(2, df)
            })
            .collect()
    }

    /// ln((1 + n) / (1 + df)) + 1
    fn smoothed_idf(n_documents: usize, df: usize) -> f64 {
        ((1.0 + n_documents as f64) / (1.0 + df as f64)).ln() + 1.0
    }

    fn cosine(a: &[f64], b: &[f64]) -> f64 {
        let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            (dot_product / (norm_a * norm_b)).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "Python Data Analysis expert",
        "Java backend developer",
        "Senior Python developer with data pipelines and Python tooling",
        "",
        "a b c",
        "Data analysis, data visualisation and machine learning",
    ];

    #[test]
    fn test_symmetry() {
        let engine = SimilarityEngine::new();
        for a in SAMPLES {
            for b in SAMPLES {
                assert_eq!(engine.similarity(a, b), engine.similarity(b, a));
            }
        }
    }

    #[test]
    fn test_bounds() {
        let engine = SimilarityEngine::new();
        for a in SAMPLES {
            for b in SAMPLES {
                let sim = engine.similarity(a, b);
                assert!((0.0..=1.0).contains(&sim), "{} vs {} gave {}", a, b, sim);
            }
        }
    }

    #[test]
    fn test_self_similarity_is_one() {
        let engine = SimilarityEngine::new();
        for text in SAMPLES.iter().filter(|t| !t.trim().is_empty() && **t != "a b c") {
            assert_eq!(engine.similarity(text, text), 1.0);
        }
    }

    #[test]
    fn test_degenerate_inputs_are_zero() {
        let engine = SimilarityEngine::new();
        assert_eq!(engine.similarity("", ""), 0.0);
        assert_eq!(engine.similarity("", "Python"), 0.0);
        assert_eq!(engine.similarity("a b c", "a b c"), 0.0);
        assert_eq!(engine.similarity("Python expert", "Java developer"), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        let engine = SimilarityEngine::new();
        let sim = engine.similarity(SAMPLES[0], SAMPLES[2]);
        assert!(sim > 0.0 && sim < 1.0);

        // Two shared terms score higher than one
        let closer = engine.similarity("python data", "python data rust");
        let further = engine.similarity("python data", "python go rust");
        assert!(closer > further);
    }

    #[test]
    fn test_known_value() {
        // "x y" vs "x z": shared term idf 1, unique terms idf ln(1.5) + 1
        let engine = SimilarityEngine::new();
        let unique = (1.5f64).ln() + 1.0;
        let expected = 1.0 / (1.0 + unique * unique);
        let sim = engine.similarity("xx yy", "xx zz");
        assert!((sim - expected).abs() < 1e-12);
    }

    #[test]
    fn test_pairwise_edges() {
        let engine = SimilarityEngine::new();
        let documents = vec![
            Document::new("a", "python data"),
            Document::new("b", "python rust"),
            Document::new("c", "go"),
        ];

        let edges = engine.pairwise(&documents);
        let pairs: Vec<(&str, &str)> = edges
            .iter()
            .map(|e| (e.first.as_str(), e.second.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "b"), ("a", "c"), ("b", "c")]);
        assert_eq!(edges[1].similarity, 0.0);

        assert!(engine.pairwise(&documents[..1]).is_empty());
        assert!(engine.pairwise(&[]).is_empty());
    }
}
