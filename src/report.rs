use std::path::{Path, PathBuf};

use crate::distribution::SentimentDistribution;
use crate::export::format_table;
use crate::table::TweetTable;

pub const TITLE: &str = "Twitter Data Visualization";

/// Heading and the one-line explanation printed under each section.
pub const SECTIONS: [(&str, &str); 5] = [
    (
        "Raw Data",
        "The raw data consists of the original tweets fetched from Twitter.",
    ),
    (
        "Cleaned Data",
        "The cleaned data removes unnecessary characters and converts text to lowercase.",
    ),
    (
        "Word Cloud",
        "The word cloud visualizes the most frequently occurring words in the tweets.",
    ),
    (
        "Sentiment Analysis",
        "The sentiment analysis predicts whether a tweet is positive (1) or negative (0).",
    ),
    (
        "Sentiment Distribution",
        "The pie chart shows the share of negative and positive predictions.",
    ),
];

/// Number of words listed in the word-cloud section.
const TOP_WORDS: usize = 20;

/// Files produced by a run.
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    pub export: Option<PathBuf>,
    pub word_cloud: Option<PathBuf>,
    pub pie_chart: Option<PathBuf>,
}

impl Artifacts {
    pub fn paths(&self) -> Vec<PathBuf> {
        [&self.export, &self.word_cloud, &self.pie_chart]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

fn image_line(label: &str, path: Option<&Path>) -> String {
    match path {
        Some(p) => format!("{label}: {}", p.display()),
        None => format!("{label}: not rendered"),
    }
}

/// Top-level heading printed before any section.
pub fn title() -> String {
    format!("# {TITLE}\n")
}

fn section(index: usize, body: &str) -> String {
    let (heading, caption) = SECTIONS[index];
    format!("\n## {heading}\n{body}{caption}\n")
}

/// Every original column.
pub fn raw_section(table: &TweetTable, max_rows: usize) -> String {
    section(0, &format_table(table.columns(), table.rows(), Some(max_rows)))
}

/// `text` next to `cleaned_text`.
pub fn cleaned_section(table: &TweetTable, max_rows: usize) -> String {
    let cleaned = table.cleaned_text().unwrap_or(&[]);
    let rows: Vec<Vec<String>> = table
        .texts()
        .zip(cleaned)
        .map(|(t, c)| vec![t.to_string(), c.clone()])
        .collect();
    let headers = ["text".to_string(), "cleaned_text".to_string()];
    section(1, &format_table(&headers, &rows, Some(max_rows)))
}

/// Image path (if rendered) and the most frequent words.
pub fn word_cloud_section(frequencies: &[(String, u32)], image: Option<&Path>) -> String {
    let top: Vec<String> = frequencies
        .iter()
        .take(TOP_WORDS)
        .map(|(w, c)| format!("{w} ({c})"))
        .collect();
    let body = format!(
        "{}\nTop words: {}\n",
        image_line("Image", image),
        top.join(", ")
    );
    section(2, &body)
}

/// `cleaned_text` next to `predicted_sentiment`.
pub fn sentiment_section(table: &TweetTable, max_rows: usize) -> String {
    let cleaned = table.cleaned_text().unwrap_or(&[]);
    let predicted = table.predicted_sentiment().unwrap_or(&[]);
    let rows: Vec<Vec<String>> = cleaned
        .iter()
        .zip(predicted)
        .map(|(c, p)| vec![c.clone(), p.as_label().to_string()])
        .collect();
    let headers = ["cleaned_text".to_string(), "predicted_sentiment".to_string()];
    section(3, &format_table(&headers, &rows, Some(max_rows)))
}

/// Chart path (if rendered) and the two count lines.
pub fn distribution_section(dist: &SentimentDistribution, chart: Option<&Path>) -> String {
    let mut body = image_line("Chart", chart);
    body.push('\n');
    for line in dist.summary_lines() {
        body.push_str(&line);
        body.push('\n');
    }
    section(4, &body)
}

pub fn saved_line(export: &Path) -> String {
    format!("\nScored table saved to {}\n", export.display())
}
