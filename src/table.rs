use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use log::{debug, info};
use serde::Serialize;

use crate::cleaner::clean_text;
use crate::error::{Error, Result};

/// Binary sentiment label. Serialized as `0` / `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    pub fn as_label(self) -> u8 {
        match self {
            Sentiment::Negative => 0,
            Sentiment::Positive => 1,
        }
    }

    pub fn from_label(label: u8) -> Option<Self> {
        match label {
            0 => Some(Sentiment::Negative),
            1 => Some(Sentiment::Positive),
            _ => None,
        }
    }
}

impl Serialize for Sentiment {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_label())
    }
}

/// The uploaded table plus the two derived columns.
///
/// `cleaned_text` and `predicted_sentiment` start out empty and can each be
/// set exactly once, cleaned text first.
#[derive(Debug, Clone)]
pub struct TweetTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    text_column: usize,
    cleaned_text: Option<Vec<String>>,
    predicted_sentiment: Option<Vec<Sentiment>>,
}

impl TweetTable {
    /// Parses CSV with a header row and checks that `text_column` exists.
    pub fn from_reader<R: Read>(reader: R, text_column: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
        if columns.iter().all(|c| c.is_empty()) {
            return Err(Error::EmptyInput);
        }
        let text_column = column_index(&columns, text_column)?;

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect::<Vec<_>>());
        }
        if rows.is_empty() {
            return Err(Error::EmptyInput);
        }
        debug!("parsed {} rows with columns {:?}", rows.len(), columns);

        Ok(TweetTable {
            columns,
            rows,
            text_column,
            cleaned_text: None,
            predicted_sentiment: None,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Original tweet text, row by row.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(|r| r.get(self.text_column).map(String::as_str).unwrap_or(""))
    }

    /// Values of any column by name.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = column_index(&self.columns, name)?;
        Ok(self
            .rows
            .iter()
            .map(|r| r.get(idx).map(String::as_str).unwrap_or(""))
            .collect())
    }

    /// Derives `cleaned_text` from `text`.
    pub fn clean(&mut self) -> Result<&[String]> {
        if self.cleaned_text.is_some() {
            return Err(Error::ColumnOrder("cleaned_text is already set"));
        }
        let cleaned: Vec<String> = self.texts().map(clean_text).collect();
        let empty = cleaned.iter().filter(|c| c.is_empty()).count();
        info!("cleaned {} rows ({} empty after cleaning)", cleaned.len(), empty);
        let cleaned = self.cleaned_text.insert(cleaned);
        Ok(cleaned.as_slice())
    }

    pub fn cleaned_text(&self) -> Option<&[String]> {
        self.cleaned_text.as_deref()
    }

    /// Attaches one prediction per row. Requires `cleaned_text`.
    pub fn set_predictions(&mut self, predictions: Vec<Sentiment>) -> Result<()> {
        if self.cleaned_text.is_none() {
            return Err(Error::ColumnOrder(
                "predicted_sentiment requires cleaned_text",
            ));
        }
        if self.predicted_sentiment.is_some() {
            return Err(Error::ColumnOrder("predicted_sentiment is already set"));
        }
        if predictions.len() != self.rows.len() {
            return Err(Error::LabelMismatch {
                labels: predictions.len(),
                rows: self.rows.len(),
            });
        }
        self.predicted_sentiment = Some(predictions);
        Ok(())
    }

    pub fn predicted_sentiment(&self) -> Option<&[Sentiment]> {
        self.predicted_sentiment.as_deref()
    }

    /// Rows of the finished table, for export.
    pub fn scored_rows(&self) -> Vec<ScoredRow<'_>> {
        let cleaned = self.cleaned_text.as_deref().unwrap_or(&[]);
        let predicted = self.predicted_sentiment.as_deref().unwrap_or(&[]);
        self.texts()
            .zip(cleaned)
            .zip(predicted)
            .map(|((text, cleaned_text), &predicted_sentiment)| ScoredRow {
                text,
                cleaned_text,
                predicted_sentiment,
            })
            .collect()
    }
}

/// One exported row: original text and both derived columns.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRow<'a> {
    pub text: &'a str,
    pub cleaned_text: &'a str,
    pub predicted_sentiment: Sentiment,
}

/// Reads a CSV file, or stdin when `path` is `-`.
pub fn read_csv(path: &Path, text_column: &str) -> Result<TweetTable> {
    if path.as_os_str() == "-" {
        info!("reading CSV from stdin");
        return TweetTable::from_reader(std::io::stdin().lock(), text_column);
    }
    info!("reading CSV from {}", path.display());
    let file = File::open(path)?;
    TweetTable::from_reader(file, text_column)
}

fn column_index(columns: &[String], name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| Error::MissingColumn {
            column: name.to_string(),
            available: columns.to_vec(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> Result<TweetTable> {
        TweetTable::from_reader(csv.as_bytes(), "text")
    }

    #[test]
    fn keeps_all_original_columns() {
        let t = table("id,text,user\n1,Hello World,a\n2,Bye!,b\n").unwrap();
        assert_eq!(t.columns(), ["id", "text", "user"]);
        assert_eq!(t.len(), 2);
        assert!(!t.is_empty());
        assert_eq!(t.texts().collect::<Vec<_>>(), vec!["Hello World", "Bye!"]);
    }

    #[test]
    fn missing_text_column_is_a_schema_error() {
        match table("id,body\n1,hi\n") {
            Err(Error::MissingColumn { column, available }) => {
                assert_eq!(column, "text");
                assert_eq!(available, vec!["id", "body"]);
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_and_header_only_are_rejected() {
        assert!(matches!(table(""), Err(Error::EmptyInput)));
        assert!(matches!(table("text\n"), Err(Error::EmptyInput)));
    }

    #[test]
    fn ragged_rows_are_a_csv_error() {
        assert!(matches!(table("id,text\n1,a,extra\n"), Err(Error::Csv(_))));
    }

    #[test]
    fn derived_columns_follow_fixed_order() {
        let mut t = table("text\nGood DAY!\nbad day\n").unwrap();
        assert!(matches!(
            t.set_predictions(vec![Sentiment::Positive, Sentiment::Negative]),
            Err(Error::ColumnOrder(_))
        ));
        assert_eq!(t.clean().unwrap(), ["good day", "bad day"]);
        assert!(matches!(t.clean(), Err(Error::ColumnOrder(_))));
        assert!(matches!(
            t.set_predictions(vec![Sentiment::Positive]),
            Err(Error::LabelMismatch { labels: 1, rows: 2 })
        ));
        t.set_predictions(vec![Sentiment::Positive, Sentiment::Negative])
            .unwrap();
        let rows = t.scored_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].cleaned_text, "bad day");
        assert_eq!(rows[1].predicted_sentiment, Sentiment::Negative);
    }

    #[test]
    fn sentiment_serializes_as_integer() {
        let json = serde_json::to_string(&[Sentiment::Negative, Sentiment::Positive]).unwrap();
        assert_eq!(json, "[0,1]");
        assert_eq!(Sentiment::from_label(1), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label(2), None);
    }
}
