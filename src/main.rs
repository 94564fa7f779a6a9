#![forbid(unsafe_code)]
//! # tweet_insight CLI
//!
//! Runs the tweet pipeline on a CSV file and prints the five report sections:
//! raw data, cleaned data, word cloud, sentiment analysis and sentiment
//! distribution. The scored table and both images are written to `--out-dir`.
//!
//! ## Example
//! ```bash
//! cargo run --release -- tweets.csv --export-format csv --seed 42
//! ```
//!
//! See `--help` for all available options.

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info};
use tweet_insight::{
    ClassifierConfig, ExportFormat, PieConfig, PipelineOptions, WordCloudConfig, run_pipeline,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// CSV file to analyze (`-` reads stdin)
    path: PathBuf,

    /// Column holding the tweet text
    #[arg(long, default_value = "text")]
    text_column: String,

    /// Train on real 0/1 labels from this column instead of alternating placeholder labels
    #[arg(long)]
    label_column: Option<String>,

    /// Optional path to additional stopword file (.txt, one word per line)
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Maximum number of words in the word cloud
    #[arg(long, default_value_t = 200)]
    max_words: usize,

    /// Seed for a reproducible word-cloud layout
    #[arg(long)]
    seed: Option<u64>,

    /// Rows shown per table section on stdout
    #[arg(long, default_value_t = 20)]
    max_rows: usize,

    /// Output format for the scored table (txt, csv, tsv, json)
    #[arg(long, default_value = "txt")]
    export_format: ExportFormat,

    /// Directory for exports and images
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// TTF/OTF font for image text (default: first system font found)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Skip rendering the word cloud and pie chart images
    #[arg(long, default_value_t = false)]
    no_images: bool,
}

impl Cli {
    fn options(&self) -> PipelineOptions {
        PipelineOptions {
            text_column: self.text_column.clone(),
            label_column: self.label_column.clone(),
            stopwords: self.stopwords.clone(),
            word_cloud: WordCloudConfig {
                max_words: self.max_words,
                seed: self.seed,
                ..WordCloudConfig::default()
            },
            classifier: ClassifierConfig::default(),
            pie: PieConfig::default(),
            export_format: self.export_format,
            out_dir: self.out_dir.clone(),
            render_images: !self.no_images,
            font: self.font.clone(),
            max_rows: self.max_rows,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // Sections are printed as their stages finish.
    match run_pipeline(&cli.path, &cli.options(), &mut io::stdout().lock()) {
        Ok(report) => {
            for path in report.artifacts.paths() {
                info!("wrote {}", path.display());
            }
        }
        Err(e) => {
            error!("Error analyzing {}: {}", cli.path.display(), e);
            process::exit(1);
        }
    }
}
