//! Placeholder sentiment scoring: TF-IDF features, logistic regression, and
//! pluggable training labels.

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::table::{Sentiment, TweetTable};
use crate::tfidf::{SparseRow, TfIdfVectorizer};

/// Supplies one training label per row.
///
/// The default [`AlternatingLabels`] fabricates labels; swap in
/// [`ColumnLabels`] (or your own provider) once real labels exist.
pub trait LabelProvider {
    fn labels(&self, table: &TweetTable) -> Result<Vec<Sentiment>>;
}

/// Even row index → positive, odd → negative. Not a sentiment signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlternatingLabels;

impl LabelProvider for AlternatingLabels {
    fn labels(&self, table: &TweetTable) -> Result<Vec<Sentiment>> {
        Ok((0..table.len())
            .map(|i| {
                if i % 2 == 0 {
                    Sentiment::Positive
                } else {
                    Sentiment::Negative
                }
            })
            .collect())
    }
}

/// Reads `0` / `1` labels from a column of the uploaded table.
#[derive(Debug, Clone)]
pub struct ColumnLabels {
    pub column: String,
}

impl ColumnLabels {
    pub fn new(column: impl Into<String>) -> Self {
        ColumnLabels {
            column: column.into(),
        }
    }
}

impl LabelProvider for ColumnLabels {
    fn labels(&self, table: &TweetTable) -> Result<Vec<Sentiment>> {
        table
            .column(&self.column)?
            .into_iter()
            .enumerate()
            .map(|(row, raw)| {
                raw.trim()
                    .parse::<u8>()
                    .ok()
                    .and_then(Sentiment::from_label)
                    .ok_or_else(|| Error::InvalidLabel {
                        row,
                        value: raw.to_string(),
                    })
            })
            .collect()
    }
}

/// Hyperparameters for [`LogisticRegression`].
#[derive(Debug, Clone, Copy)]
pub struct ClassifierConfig {
    /// Inverse L2 regularization strength.
    pub c: f64,
    pub max_iter: usize,
    /// Stop once the gradient norm drops below this.
    pub tol: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-6,
        }
    }
}

/// Binary L2-regularized logistic regression over sparse rows.
///
/// Minimizes `0.5·|w|² + C·Σ log-loss` with an unpenalized intercept using
/// full-batch gradient descent.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    config: ClassifierConfig,
    weights: Vec<f64>,
    intercept: f64,
    iterations: usize,
}

impl LogisticRegression {
    pub fn new(config: ClassifierConfig) -> Self {
        LogisticRegression {
            config,
            weights: Vec::new(),
            intercept: 0.0,
            iterations: 0,
        }
    }

    pub fn fit(&mut self, rows: &[SparseRow], n_features: usize, labels: &[Sentiment]) -> Result<()> {
        if rows.len() != labels.len() {
            return Err(Error::LabelMismatch {
                labels: labels.len(),
                rows: rows.len(),
            });
        }
        if rows.len() < 2 {
            return Err(Error::TooFewRows {
                found: rows.len(),
                required: 2,
            });
        }
        let positives = labels.iter().filter(|&&l| l == Sentiment::Positive).count();
        if positives == 0 || positives == labels.len() {
            return Err(Error::SingleClass);
        }

        let n = rows.len() as f64;
        let targets: Vec<f64> = labels.iter().map(|l| f64::from(l.as_label())).collect();
        // Objective scaled by 1/(C·n): mean log-loss + |w|²/(2·C·n).
        let reg = 1.0 / (self.config.c * n);
        let max_row_sq = rows
            .iter()
            .map(|r| r.iter().map(|(_, x)| x * x).sum::<f64>() + 1.0)
            .fold(0.0, f64::max);
        let step = 1.0 / (0.25 * max_row_sq + reg);

        self.weights = vec![0.0; n_features];
        self.intercept = 0.0;
        self.iterations = 0;

        let mut grad = vec![0.0; n_features];
        for iter in 0..self.config.max_iter {
            grad.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;
            for (row, y) in rows.iter().zip(&targets) {
                let err = sigmoid(self.decision(row)) - y;
                for &(j, x) in row {
                    grad[j] += err * x;
                }
                grad_b += err;
            }
            let mut norm_sq = 0.0;
            for (g, w) in grad.iter_mut().zip(&self.weights) {
                *g = *g / n + reg * w;
                norm_sq += *g * *g;
            }
            grad_b /= n;
            norm_sq += grad_b * grad_b;

            self.iterations = iter + 1;
            if norm_sq.sqrt() < self.config.tol {
                break;
            }
            for (w, g) in self.weights.iter_mut().zip(&grad) {
                *w -= step * g;
            }
            self.intercept -= step * grad_b;
        }
        if self.iterations == self.config.max_iter {
            warn!(
                "logistic regression stopped at max_iter={} before converging",
                self.config.max_iter
            );
        }
        debug!(
            "fitted logistic regression on {} rows x {} features in {} iterations",
            rows.len(),
            n_features,
            self.iterations
        );
        Ok(())
    }

    /// `w·x + b`.
    pub fn decision(&self, row: &SparseRow) -> f64 {
        row.iter()
            .map(|&(j, x)| self.weights.get(j).copied().unwrap_or(0.0) * x)
            .sum::<f64>()
            + self.intercept
    }

    pub fn predict_proba(&self, row: &SparseRow) -> f64 {
        sigmoid(self.decision(row))
    }

    pub fn predict(&self, row: &SparseRow) -> Sentiment {
        if self.decision(row) > 0.0 {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Vectorizes `cleaned`, fits against the provider's labels and predicts every row.
pub fn score_sentiment(
    table: &TweetTable,
    labels: &dyn LabelProvider,
    config: ClassifierConfig,
) -> Result<Vec<Sentiment>> {
    let cleaned = table
        .cleaned_text()
        .ok_or(Error::ColumnOrder("sentiment scoring requires cleaned_text"))?;
    if cleaned.len() < 2 {
        return Err(Error::TooFewRows {
            found: cleaned.len(),
            required: 2,
        });
    }

    let mut vectorizer = TfIdfVectorizer::new();
    let rows = vectorizer.fit_transform(cleaned)?;
    let targets = labels.labels(table)?;

    let mut model = LogisticRegression::new(config);
    model.fit(&rows, vectorizer.n_terms(), &targets)?;
    let predictions: Vec<Sentiment> = rows.iter().map(|r| model.predict(r)).collect();
    info!(
        "scored {} rows over a vocabulary of {} terms",
        predictions.len(),
        vectorizer.n_terms()
    );
    Ok(predictions)
}
