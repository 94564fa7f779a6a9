use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use clap::ValueEnum;
use csv::WriterBuilder;

use crate::error::Result;
use crate::table::TweetTable;

/// File format for the scored table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }
}

/// Neutralizes spreadsheet formula injection: a cell starting with `=`, `+`,
/// `-`, `@`, tab or carriage return gets a leading `'`.
///
/// # Example
/// ```
/// use tweet_insight::csv_safe_cell;
/// assert_eq!(csv_safe_cell("=1+1".to_string()), "'=1+1");
/// assert_eq!(csv_safe_cell("hello".to_string()), "hello");
/// ```
pub fn csv_safe_cell(cell: String) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell,
    }
}

/// Local timestamp used in output file names.
pub fn timestamp() -> String {
    let local: DateTime<Local> = Local::now();
    local.format("%Y%m%d_%H%M%S").to_string()
}

/// `<dir>/<stem>_<timestamp>_<suffix>.<ext>`
pub fn output_path(dir: &Path, stem: &str, timestamp: &str, suffix: &str, ext: &str) -> PathBuf {
    dir.join(format!("{stem}_{timestamp}_{suffix}.{ext}"))
}

/// Writes `text`, `cleaned_text`, `predicted_sentiment` for every row.
pub fn export_scored(table: &TweetTable, format: ExportFormat, path: &Path) -> Result<()> {
    let rows = table.scored_rows();
    let file = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Json => {
            let mut out = file;
            serde_json::to_writer_pretty(&mut out, &rows)?;
            out.flush()?;
        }
        ExportFormat::Csv | ExportFormat::Tsv => {
            let delimiter = if format == ExportFormat::Tsv { b'\t' } else { b',' };
            let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(file);
            wtr.write_record(["text", "cleaned_text", "predicted_sentiment"])?;
            for row in &rows {
                wtr.write_record([
                    csv_safe_cell(row.text.to_string()),
                    csv_safe_cell(row.cleaned_text.to_string()),
                    row.predicted_sentiment.as_label().to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        ExportFormat::Txt => {
            let mut out = file;
            let body: Vec<Vec<String>> = rows
                .iter()
                .map(|r| {
                    vec![
                        r.text.to_string(),
                        r.cleaned_text.to_string(),
                        r.predicted_sentiment.as_label().to_string(),
                    ]
                })
                .collect();
            let headers = ["text", "cleaned_text", "predicted_sentiment"].map(String::from);
            out.write_all(format_table(&headers, &body, None).as_bytes())?;
            out.flush()?;
        }
    }
    Ok(())
}

/// Longest cell shown in text tables before truncation.
const MAX_CELL: usize = 60;

/// Plain-text table with a row index column, optionally truncated to `max_rows`.
pub fn format_table(headers: &[String], rows: &[Vec<String>], max_rows: Option<usize>) -> String {
    let shown = max_rows.map_or(rows.len(), |m| m.min(rows.len()));
    let clip = |s: &str| -> String {
        let flat = s.replace(&['\n', '\r', '\t'][..], " ");
        if flat.chars().count() > MAX_CELL {
            let mut cut: String = flat.chars().take(MAX_CELL - 3).collect();
            cut.push_str("...");
            cut
        } else {
            flat
        }
    };

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(shown + 1);
    let mut header = vec![String::new()];
    header.extend(headers.iter().map(|h| clip(h.as_str())));
    cells.push(header);
    for (i, row) in rows.iter().take(shown).enumerate() {
        let mut line = vec![i.to_string()];
        line.extend(row.iter().map(|c| clip(c.as_str())));
        cells.push(line);
    }

    let n_cols = cells.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..n_cols)
        .map(|c| {
            cells
                .iter()
                .filter_map(|r| r.get(c))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(c, s)| format!("{:<width$}", s, width = widths[c]))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    if shown < rows.len() {
        out.push_str(&format!("... ({} more rows)\n", rows.len() - shown));
    }
    out
}
