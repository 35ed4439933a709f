//! Text extraction from various file formats

use crate::error::{CvRankerError, Result};
use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            CvRankerError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", path.display(), e))
        })?;
        Ok(text)
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        let docx = docx_rs::read_docx(&bytes).map_err(|e| {
            CvRankerError::DocxExtraction(format!("Failed to read DOCX '{}': {}", path.display(), e))
        })?;

        // One line per paragraph; tables and other block elements are skipped
        let paragraphs: Vec<String> = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(paragraph) => Some(
                    paragraph
                        .children
                        .iter()
                        .filter_map(|p| match p {
                            ParagraphChild::Run(run) => Some(run),
                            _ => None,
                        })
                        .flat_map(|run| run.children.iter())
                        .filter_map(|r| match r {
                            RunChild::Text(text) => Some(text.text.as_str()),
                            _ => None,
                        })
                        .collect::<String>(),
                ),
                _ => None,
            })
            .collect();

        Ok(paragraphs.join("\n"))
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).await?;
        Ok(content)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;
        Ok(Self::markdown_to_text(&markdown_content))
    }
}

impl MarkdownExtractor {
    pub fn markdown_to_text(markdown: &str) -> String {
        let parser = Parser::new(markdown);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        Self::html_to_text(&html_output)
    }

    fn html_to_text(html: &str) -> String {
        // Tags are stripped before entities are decoded so "&lt;" survives as text
        let tag_regex = Regex::new(r"<[^>]*>").expect("Invalid tag regex");
        let text = html
            .replace("<br>", "\n")
            .replace("</p>", "\n\n");
        let stripped = tag_regex.replace_all(&text, "");

        let decoded = stripped
            .replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&");

        decoded
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_text_strips_formatting() {
        let text = MarkdownExtractor::markdown_to_text("# Jane Roe\n\n**Skills**: Rust & *Python*\n\n- SQL");

        assert!(text.contains("Jane Roe"));
        assert!(text.contains("Skills: Rust & Python"));
        assert!(text.contains("SQL"));
        assert!(!text.contains('#'));
        assert!(!text.contains("**"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_markdown_entities_decoded_after_tag_strip() {
        let text = MarkdownExtractor::markdown_to_text("Uses `Vec<T>` in C++");
        assert!(text.contains("Vec<T>"));
    }
}
