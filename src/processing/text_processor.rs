//! Text normalization and tokenization

use regex::Regex;
use std::collections::BTreeMap;
use unicode_segmentation::UnicodeSegmentation;

pub struct TextProcessor {
    whitespace_regex: Regex,
    min_token_chars: usize,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let whitespace_regex = Regex::new(r"\s+").expect("Invalid whitespace regex");

        Self {
            whitespace_regex,
            min_token_chars: 2,
        }
    }

    /// Collapse whitespace and fold typographic punctuation to ASCII
    pub fn clean_text(&self, text: &str) -> String {
        let collapsed = self.whitespace_regex.replace_all(text, " ");
        Self::normalize_unicode(collapsed.trim())
    }

    /// Lower-cased word tokens of at least two characters.
    ///
    /// Single characters and pure punctuation carry no term weight, which is
    /// what makes a document like "a b c" produce an empty vector.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let cleaned = self.clean_text(text);

        cleaned
            .unicode_words()
            .map(|word| word.to_lowercase())
            .filter(|word| word.chars().count() >= self.min_token_chars)
            .filter(|word| word.chars().any(|c| c.is_alphanumeric()))
            .collect()
    }

    /// Raw term counts, ordered by term
    pub fn term_counts(&self, text: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for token in self.tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        counts
    }

    fn normalize_unicode(text: &str) -> String {
        text.chars()
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                '\u{2013}' | '\u{2014}' => '-',
                '\u{2026}' => '.',
                _ => c,
            })
            .collect()
    }
}
