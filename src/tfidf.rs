//! TF-IDF vectorization fitted on a single batch of documents.
//!
//! Raw term counts times smoothed idf `ln((1 + n) / (1 + df)) + 1`, each row
//! L2-normalized. Rows are stored sparse since tweets use a tiny slice of
//! the vocabulary.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::cleaner::tokens;
use crate::error::{Error, Result};

/// Sparse row: `(term index, weight)` sorted by term index.
pub type SparseRow = Vec<(usize, f64)>;

#[derive(Debug, Clone, Default)]
pub struct TfIdfVectorizer {
    vocabulary: HashMap<String, usize>,
    terms: Vec<String>,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the vocabulary (alphabetical) and idf weights from `documents`.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in documents {
            let unique: HashSet<&str> = tokens(doc.as_ref()).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }
        if doc_freq.is_empty() {
            return Err(Error::EmptyVocabulary);
        }

        let n_docs = documents.len() as f64;
        self.vocabulary.clear();
        self.terms.clear();
        self.idf.clear();
        for (idx, (term, df)) in doc_freq.into_iter().enumerate() {
            self.vocabulary.insert(term.to_string(), idx);
            self.terms.push(term.to_string());
            self.idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
        }
        Ok(())
    }

    /// Vectorizes one document against the fitted vocabulary. Unknown terms are ignored.
    pub fn transform(&self, document: &str) -> SparseRow {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in tokens(document) {
            if let Some(&idx) = self.vocabulary.get(term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        let mut row: SparseRow = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        l2_normalize(&mut row);
        row
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Vec<SparseRow>> {
        self.fit(documents)?;
        Ok(documents
            .iter()
            .map(|d| self.transform(d.as_ref()))
            .collect())
    }

    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }
}

fn l2_normalize(row: &mut SparseRow) {
    let norm = row.iter().map(|(_, x)| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, x) in row.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn vocabulary_is_sorted_and_skips_one_letter_tokens() {
        let mut v = TfIdfVectorizer::new();
        v.fit(&["the cat", "a dog and the cat"]).unwrap();
        assert_eq!(v.terms(), ["and", "cat", "dog", "the"]);
    }

    #[test]
    fn smoothed_idf_values() {
        let mut v = TfIdfVectorizer::new();
        v.fit(&["apple banana", "apple", "cherry"]).unwrap();
        // apple df=2, banana df=1, cherry df=1, n=3
        assert!(approx(v.idf()[0], (4.0f64 / 3.0).ln() + 1.0));
        assert!(approx(v.idf()[1], (4.0f64 / 2.0).ln() + 1.0));
    }

    #[test]
    fn rows_are_unit_length_or_empty() {
        let mut v = TfIdfVectorizer::new();
        let rows = v.fit_transform(&["good good day", "", "bad day"]).unwrap();
        let norm = |r: &SparseRow| r.iter().map(|(_, x)| x * x).sum::<f64>().sqrt();
        assert!(approx(norm(&rows[0]), 1.0));
        assert!(rows[1].is_empty());
        assert!(approx(norm(&rows[2]), 1.0));
        // "good" appears twice in the first row and outweighs "day"
        let good = v.terms().iter().position(|t| t == "good").unwrap();
        let day = v.terms().iter().position(|t| t == "day").unwrap();
        let weight = |idx| rows[0].iter().find(|(i, _)| *i == idx).unwrap().1;
        assert!(weight(good) > weight(day));
    }

    #[test]
    fn empty_vocabulary_is_an_error() {
        let mut v = TfIdfVectorizer::new();
        assert!(matches!(v.fit(&["", "a b c"]), Err(Error::EmptyVocabulary)));
    }

    #[test]
    fn unknown_terms_are_ignored_on_transform() {
        let mut v = TfIdfVectorizer::new();
        v.fit(&["alpha beta"]).unwrap();
        assert!(v.transform("gamma delta").is_empty());
    }
}
