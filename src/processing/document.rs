//! Document structures

use crate::processing::rating::Rating;
use serde::{Deserialize, Serialize};

/// A CV taking part in one ranking batch.
///
/// The text is fixed at construction; scoring and rating refinement only
/// fill in the derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    content: String,
    pub metadata: DocumentMetadata,
    pub skill_score: u32,
    pub matched_keywords: Vec<String>,
    pub rating: Option<Rating>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub word_count: usize,
    pub character_count: usize,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let word_count = content.split_whitespace().count();
        let character_count = content.chars().count();

        Self {
            name: name.into(),
            content,
            metadata: DocumentMetadata {
                word_count,
                character_count,
            },
            skill_score: 0,
            matched_keywords: Vec::new(),
            rating: None,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let doc = Document::new("cv1.pdf", "Jane Roe\nData Engineer\n\nSkills: Rust, Python");

        assert_eq!(doc.name, "cv1.pdf");
        assert_eq!(doc.metadata.word_count, 7);
        assert_eq!(doc.skill_score, 0);
        assert!(doc.rating.is_none());
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_blank_document_is_empty() {
        assert!(Document::new("blank.txt", "  \n\t").is_empty());
    }
}
