//! Keyword-based skill scoring

use crate::error::{CvRankerError, Result};
use aho_corasick::{AhoCorasick, MatchKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered, case-insensitively unique list of skill keywords
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSet {
    terms: Vec<String>,
}

impl KeywordSet {
    /// Trims every term and drops blanks and case-insensitive repeats,
    /// keeping the first spelling seen.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(t.to_lowercase()))
            .collect();

        Self { terms }
    }

    /// Parse a comma separated list such as "Python, Machine Learning"
    pub fn parse(input: &str) -> Self {
        Self::new(input.split(','))
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Counts how many distinct keywords a text mentions
pub struct SkillScorer {
    keywords: KeywordSet,
    matcher: Option<AhoCorasick>,
}

impl SkillScorer {
    pub fn new(keywords: KeywordSet) -> Result<Self> {
        let matcher = if keywords.is_empty() {
            None
        } else {
            let patterns: Vec<String> = keywords
                .terms()
                .iter()
                .map(|k| k.to_lowercase())
                .collect();
            // Overlapping search needs standard semantics so that "Data" and
            // "Data Analysis" are both reported from the same position.
            let matcher = AhoCorasick::builder()
                .match_kind(MatchKind::Standard)
                .build(&patterns)
                .map_err(|e| {
                    CvRankerError::TextProcessing(format!("Failed to build keyword matcher: {}", e))
                })?;
            Some(matcher)
        };

        Ok(Self { keywords, matcher })
    }

    /// Indices into the keyword set of every keyword found in `text`
    fn matched_indices(&self, text: &str) -> Vec<usize> {
        let Some(matcher) = &self.matcher else {
            return Vec::new();
        };

        let lowered = text.to_lowercase();
        let mut found = vec![false; self.keywords.len()];
        for mat in matcher.find_overlapping_iter(&lowered) {
            found[mat.pattern().as_usize()] = true;
        }

        found
            .into_iter()
            .enumerate()
            .filter_map(|(idx, hit)| hit.then_some(idx))
            .collect()
    }

    /// Number of distinct keywords occurring at least once, case-insensitively
    pub fn score(&self, text: &str) -> u32 {
        self.matched_indices(text).len() as u32
    }

    /// Matched keywords in keyword-set order
    pub fn matched_keywords(&self, text: &str) -> Vec<String> {
        self.matched_indices(text)
            .into_iter()
            .map(|idx| self.keywords.terms()[idx].clone())
            .collect()
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }
}

/// One-shot convenience over [`SkillScorer`]
pub fn skill_score(text: &str, keywords: &KeywordSet) -> Result<u32> {
    Ok(SkillScorer::new(keywords.clone())?.score(text))
}
