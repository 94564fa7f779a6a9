//! # tweet_insight
//!
//! Cleans a CSV of tweets, counts words for a word cloud, scores placeholder
//! sentiment with TF-IDF and logistic regression, and summarizes the
//! predicted distribution as a pie chart.
//!
//! The pipeline itself ([`analyze_table`]) is a pure transform over one
//! in-memory table; [`run_pipeline`] adds file input, exports and images.
//!
//! ```
//! use tweet_insight::{AlternatingLabels, PipelineOptions, TweetTable, analyze_table};
//!
//! let csv = "text\nLoving this! http://t.co/x\nWorst day ever\nso so good\nnot great\n";
//! let table = TweetTable::from_reader(csv.as_bytes(), "text").unwrap();
//! let analysis = analyze_table(table, &PipelineOptions::default(), &AlternatingLabels).unwrap();
//! assert_eq!(analysis.distribution.total(), 4);
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};

pub mod classifier;
pub mod cleaner;
pub mod distribution;
pub mod error;
pub mod export;
pub mod fonts;
pub mod report;
pub mod table;
pub mod tfidf;
pub mod wordcloud;

pub use classifier::{
    AlternatingLabels, ClassifierConfig, ColumnLabels, LabelProvider, LogisticRegression,
    score_sentiment,
};
pub use cleaner::clean_text;
pub use distribution::{PieConfig, SentimentDistribution, pie_slices, render_pie_chart};
pub use error::{Error, Result};
pub use export::{ExportFormat, csv_safe_cell, export_scored, format_table};
pub use report::Artifacts;
pub use table::{Sentiment, TweetTable, read_csv};
pub use tfidf::TfIdfVectorizer;
pub use wordcloud::{
    PlacedWord, WordCloudConfig, layout_words, load_stopwords, render_word_cloud,
    word_frequencies,
};

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub text_column: String,
    /// Train on real 0/1 labels from this column instead of alternating placeholders.
    pub label_column: Option<String>,
    /// Extra word-cloud stopwords, one per line.
    pub stopwords: Option<PathBuf>,
    pub word_cloud: WordCloudConfig,
    pub classifier: ClassifierConfig,
    pub pie: PieConfig,
    pub export_format: ExportFormat,
    pub out_dir: PathBuf,
    pub render_images: bool,
    pub font: Option<PathBuf>,
    /// Rows shown per table section of the report.
    pub max_rows: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            text_column: "text".to_string(),
            label_column: None,
            stopwords: None,
            word_cloud: WordCloudConfig::default(),
            classifier: ClassifierConfig::default(),
            pie: PieConfig::default(),
            export_format: ExportFormat::Txt,
            out_dir: PathBuf::from("."),
            render_images: true,
            font: None,
            max_rows: 20,
        }
    }
}

impl PipelineOptions {
    pub fn label_provider(&self) -> Box<dyn LabelProvider> {
        match &self.label_column {
            Some(column) => Box::new(ColumnLabels::new(column.clone())),
            None => Box::new(AlternatingLabels),
        }
    }
}

/// Everything derived from one table.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The input table with `cleaned_text` and `predicted_sentiment` filled in.
    pub table: TweetTable,
    pub word_frequencies: Vec<(String, u32)>,
    pub distribution: SentimentDistribution,
}

/// Result of [`run_pipeline`]: the printable report plus files written.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub result: String,
    pub analysis: Analysis,
    pub artifacts: Artifacts,
}

/// A finished stage, handed to the observer of [`analyze_table_with`].
#[derive(Debug, Clone, Copy)]
pub enum Stage<'a> {
    /// `cleaned_text` is set.
    Cleaned(&'a TweetTable),
    WordFrequencies(&'a [(String, u32)]),
    /// `predicted_sentiment` is set.
    Scored(&'a TweetTable),
    Distribution(&'a SentimentDistribution),
}

/// Cleans, counts, scores and tallies `table`. Stops at the first failing stage.
pub fn analyze_table(
    table: TweetTable,
    options: &PipelineOptions,
    labels: &dyn LabelProvider,
) -> Result<Analysis> {
    analyze_table_with(table, options, labels, |_| Ok(()))
}

/// Like [`analyze_table`], calling `on_stage` after each stage completes and
/// before the next one starts. An error from `on_stage` aborts the run.
pub fn analyze_table_with<F>(
    mut table: TweetTable,
    options: &PipelineOptions,
    labels: &dyn LabelProvider,
    mut on_stage: F,
) -> Result<Analysis>
where
    F: FnMut(Stage<'_>) -> Result<()>,
{
    info!("stage: cleaning {} rows", table.len());
    let cleaned = table.clean()?.to_vec();
    on_stage(Stage::Cleaned(&table))?;

    info!("stage: word frequencies");
    let stopwords = load_stopwords(options.stopwords.as_deref())?;
    let word_frequencies =
        word_frequencies(&cleaned, &stopwords, options.word_cloud.max_words)?;
    debug!("top words: {:?}", &word_frequencies[..word_frequencies.len().min(5)]);
    on_stage(Stage::WordFrequencies(&word_frequencies))?;

    info!("stage: sentiment scoring");
    let predictions = score_sentiment(&table, labels, options.classifier)?;
    let distribution = SentimentDistribution::from_predictions(&predictions);
    table.set_predictions(predictions)?;
    on_stage(Stage::Scored(&table))?;

    info!(
        "stage: distribution (negative={}, positive={})",
        distribution.negative, distribution.positive
    );
    on_stage(Stage::Distribution(&distribution))?;
    Ok(Analysis {
        table,
        word_frequencies,
        distribution,
    })
}

/// File stem used to name outputs; `stdin` when reading from `-`.
fn input_stem(path: &Path) -> String {
    if path.as_os_str() == "-" {
        return "stdin".to_string();
    }
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tweets".to_string())
}

/// Appends `text` to the report and writes it to `out` right away.
fn emit<W: Write>(out: &mut W, report: &mut String, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())?;
    out.flush()?;
    report.push_str(text);
    Ok(())
}

/// Reads `path`, runs the pipeline, writes the scored table and (optionally)
/// both images into `options.out_dir`.
///
/// Each report section goes to `out` as soon as its stage finishes, so a
/// failing stage leaves the earlier sections in place.
pub fn run_pipeline<W: Write>(
    path: &Path,
    options: &PipelineOptions,
    out: &mut W,
) -> Result<PipelineReport> {
    let table = read_csv(path, &options.text_column)?;
    let mut result = String::new();
    emit(out, &mut result, &report::title())?;
    emit(out, &mut result, &report::raw_section(&table, options.max_rows))?;

    std::fs::create_dir_all(&options.out_dir)?;
    let stem = input_stem(path);
    let ts = export::timestamp();
    let out_path =
        |suffix: &str, ext: &str| export::output_path(&options.out_dir, &stem, &ts, suffix, ext);

    let labels = options.label_provider();
    let mut artifacts = Artifacts::default();
    let analysis = analyze_table_with(table, options, labels.as_ref(), |stage| {
        let section = match stage {
            Stage::Cleaned(table) => report::cleaned_section(table, options.max_rows),
            Stage::WordFrequencies(frequencies) => {
                if options.render_images {
                    fonts::register(options.font.as_deref())?;
                    let cloud_path = out_path("wordcloud", "png");
                    render_word_cloud(frequencies, &options.word_cloud, &cloud_path)?;
                    artifacts.word_cloud = Some(cloud_path);
                }
                report::word_cloud_section(frequencies, artifacts.word_cloud.as_deref())
            }
            Stage::Scored(table) => {
                let export_path = out_path("sentiment", options.export_format.extension());
                export_scored(table, options.export_format, &export_path)?;
                artifacts.export = Some(export_path);
                report::sentiment_section(table, options.max_rows)
            }
            Stage::Distribution(distribution) => {
                if options.render_images {
                    let pie_path = out_path("distribution", "png");
                    render_pie_chart(distribution, &options.pie, &pie_path)?;
                    artifacts.pie_chart = Some(pie_path);
                }
                report::distribution_section(distribution, artifacts.pie_chart.as_deref())
            }
        };
        emit(out, &mut result, &section)
    })?;

    if let Some(export) = &artifacts.export {
        emit(out, &mut result, &report::saved_line(export))?;
    }
    Ok(PipelineReport {
        result,
        analysis,
        artifacts,
    })
}
