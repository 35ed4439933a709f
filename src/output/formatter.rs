//! Output formatters for ranking reports

use crate::config::OutputFormat;
use crate::error::Result;
use crate::processing::ranker::{LeaderboardEntry, RankBasis, RankingReport};
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for rendering a ranking report
pub trait OutputFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_rank(&self, rank: usize) -> String {
        let color = match rank {
            1 => Color::Green,
            2 | 3 => Color::BrightGreen,
            _ => Color::White,
        };
        self.colorize(&format!("#{:<3}", rank), color)
    }

    fn format_entry(&self, entry: &LeaderboardEntry) -> String {
        let mut line = format!(
            "{} {:<32} skills: {:>3}",
            self.format_rank(entry.rank),
            truncate_name(&entry.name, 32),
            entry.skill_score
        );
        if let Some(mu) = entry.mu {
            line.push_str(&format!("  rating: {:>7.2}", mu));
        }
        if self.detailed {
            if let Some(sigma) = entry.sigma {
                line.push_str(&format!(" ± {:.2}", sigma));
            }
            if let Some(conservative) = entry.conservative {
                line.push_str(&format!("  conservative: {:>7.2}", conservative));
            }
        }
        line.push('\n');

        if self.detailed {
            let matched = if entry.matched_keywords.is_empty() {
                "none".to_string()
            } else {
                entry.matched_keywords.join(", ")
            };
            line.push_str(&format!("     matched: {} | words: {}\n", matched, entry.word_count));
        }
        line
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 CV LEADERBOARD", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.processing_time_ms
        ));
        output.push_str(&format!("Keywords: {}\n", keywords_label(report)));
        output.push_str(&format!("Ranked by: {}\n", basis_label(report.ranked_by)));

        output.push_str(&self.format_header("Leaderboard", 2));
        if report.leaderboard.is_empty() {
            output.push_str(&self.colorize("No CVs to rank\n", Color::Yellow));
        }
        for entry in &report.leaderboard {
            output.push_str(&self.format_entry(entry));
        }

        if !report.similarities.is_empty() {
            output.push_str(&self.format_header("Pairwise Similarity", 2));
            for edge in &report.similarities {
                output.push_str(&format!(
                    "{} vs {} → Similarity: {:.2}\n",
                    edge.first, edge.second, edge.similarity
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# 📊 CV Leaderboard\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n\n",
                report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.processing_time_ms
            ));
            output.push_str(&format!("**Keywords:** {}\n\n", keywords_label(report)));
            output.push_str(&format!("**Ranked by:** {}\n\n", basis_label(report.ranked_by)));
        }

        output.push_str("## Leaderboard\n\n");
        output.push_str("| Rank | CV | Skill Score | Rating (μ) | Matched Keywords |\n");
        output.push_str("|------|----|-------------|------------|------------------|\n");
        for entry in &report.leaderboard {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                entry.rank,
                Self::escape_cell(&entry.name),
                entry.skill_score,
                entry.mu.map(|mu| format!("{:.2}", mu)).unwrap_or_else(|| "-".to_string()),
                Self::escape_cell(&entry.matched_keywords.join(", "))
            ));
        }
        output.push('\n');

        if !report.similarities.is_empty() {
            output.push_str("## Pairwise Similarity\n\n");
            output.push_str("| CV A | CV B | Similarity |\n");
            output.push_str("|------|------|------------|\n");
            for edge in &report.similarities {
                output.push_str(&format!(
                    "| {} | {} | {:.2} |\n",
                    Self::escape_cell(&edge.first),
                    Self::escape_cell(&edge.second),
                    edge.similarity
                ));
            }
            output.push('\n');
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn with_options(
        use_colors: bool,
        detailed: bool,
        pretty_json: bool,
        include_metadata: bool,
    ) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &RankingReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn keywords_label(report: &RankingReport) -> String {
    if report.keywords.is_empty() {
        "(none)".to_string()
    } else {
        report.keywords.join(", ")
    }
}

fn basis_label(basis: RankBasis) -> &'static str {
    match basis {
        RankBasis::Rating => "pairwise rating (μ)",
        RankBasis::SkillScore => "skill score",
    }
}

fn truncate_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        name.to_string()
    } else {
        let kept: String = name.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

// Utility functions for saving reports
pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, base_name: &str, timestamp: bool) -> String {
    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}{}.md", base_name, timestamp_suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::similarity::SimilarityEdge;
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample_report() -> RankingReport {
        RankingReport {
            leaderboard: vec![
                LeaderboardEntry {
                    rank: 1,
                    name: "alice.pdf".to_string(),
                    skill_score: 2,
                    mu: Some(5.71),
                    sigma: Some(7.26),
                    conservative: Some(-16.07),
                    matched_keywords: vec!["Python".to_string(), "Data Analysis".to_string()],
                    word_count: 4,
                },
                LeaderboardEntry {
                    rank: 2,
                    name: "bob|cv.docx".to_string(),
                    skill_score: 0,
                    mu: Some(-3.71),
                    sigma: Some(7.26),
                    conservative: None,
                    matched_keywords: Vec::new(),
                    word_count: 3,
                },
            ],
            similarities: vec![SimilarityEdge {
                first: "alice.pdf".to_string(),
                second: "bob|cv.docx".to_string(),
                similarity: 0.0,
            }],
            keywords: vec!["Python".to_string(), "Data Analysis".to_string()],
            ranked_by: RankBasis::Rating,
            generated_at: Utc::now(),
            processing_time_ms: 3,
        }
    }

    #[test]
    fn test_console_plain_output() {
        let output = ConsoleFormatter::new(false, true).format_report(&sample_report()).unwrap();

        assert!(output.contains("CV LEADERBOARD"));
        assert!(output.contains("alice.pdf"));
        assert!(output.contains("matched: Python, Data Analysis"));
        assert!(output.contains("matched: none"));
        assert!(output.contains("conservative:  -16.07"));
        assert!(output.contains("alice.pdf vs bob|cv.docx → Similarity: 0.00"));
        assert!(output.find("alice.pdf").unwrap() < output.find("#2").unwrap());
    }

    #[test]
    fn test_json_roundtrip() {
        let report = sample_report();
        let json = JsonFormatter::new(false).format_report(&report).unwrap();
        let parsed: RankingReport = serde_json::from_str(&json).unwrap();

        let names: Vec<&str> = parsed.leaderboard.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alice.pdf", "bob|cv.docx"]);
        assert_eq!(parsed.leaderboard[0].matched_keywords, report.leaderboard[0].matched_keywords);
        assert_eq!(parsed.ranked_by, RankBasis::Rating);
    }

    #[test]
    fn test_markdown_tables() {
        let output = MarkdownFormatter::new(false).format_report(&sample_report()).unwrap();

        assert!(output.contains("| 1 | alice.pdf | 2 | 5.71 | Python, Data Analysis |"));
        assert!(output.contains("bob\\|cv.docx"));
        assert!(output.contains("## Pairwise Similarity"));
        assert!(!output.contains("**Generated:**"));
    }

    #[test]
    fn test_generator_dispatch() {
        let generator = ReportGenerator::with_options(false, false, true, true);
        let report = sample_report();

        for format in [OutputFormat::Console, OutputFormat::Json, OutputFormat::Markdown] {
            assert!(!generator.generate_report(&report, &format).unwrap().is_empty());
        }
    }

    #[test]
    fn test_save_and_suggest_filename() {
        let temp_dir = TempDir::new().unwrap();
        let name = suggest_filename(&OutputFormat::Markdown, "leaderboard", false);
        assert_eq!(name, "leaderboard.md");

        let path = temp_dir.path().join("reports").join(name);
        save_report_to_file("# report", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# report");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("short.pdf", 32), "short.pdf");
        assert_eq!(truncate_name("abcdefghij", 8), "abcde...");
    }
}
