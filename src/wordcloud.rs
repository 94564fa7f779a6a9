//! Word frequencies and the word-cloud layout/renderer.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use log::{debug, info};
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cleaner::tokens;
use crate::error::{Error, Result};

/// Layout grid resolution in pixels.
const CELL: u32 = 4;

const PALETTE: [(u8, u8, u8); 8] = [
    (0x44, 0x01, 0x54),
    (0x46, 0x32, 0x7e),
    (0x36, 0x5c, 0x8d),
    (0x27, 0x7f, 0x8e),
    (0x1f, 0xa1, 0x87),
    (0x4a, 0xc1, 0x6d),
    (0x9f, 0xda, 0x3a),
    (0xd8, 0xc2, 0x1e),
];

const DEFAULT_STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but", "by",
    "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each", "else", "ever",
    "few", "for", "from", "further", "get", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "however", "if", "in", "into", "is", "it",
    "its", "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "of", "off",
    "on", "once", "only", "or", "other", "otherwise", "ought", "our", "ours", "ourselves", "out",
    "over", "own", "rt", "same", "shall", "she", "should", "since", "so", "some", "such", "than",
    "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "with", "would", "www", "you",
    "your", "yours", "yourself", "yourselves", "im", "ive", "dont", "cant", "wont", "isnt",
];

#[derive(Debug, Clone)]
pub struct WordCloudConfig {
    pub width: u32,
    pub height: u32,
    pub max_words: usize,
    pub min_font_size: f64,
    /// Upper bound for the most frequent word; defaults to the canvas height.
    pub max_font_size: Option<f64>,
    /// Seed for the layout; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        WordCloudConfig {
            width: 800,
            height: 400,
            max_words: 200,
            min_font_size: 4.0,
            max_font_size: None,
            seed: None,
        }
    }
}

/// Built-in stopwords, optionally extended from a file with one word per line.
pub fn load_stopwords(extra: Option<&Path>) -> Result<HashSet<String>> {
    let mut stop: HashSet<String> = DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect();
    if let Some(path) = extra {
        let content = fs::read_to_string(path)?;
        let before = stop.len();
        stop.extend(
            content
                .lines()
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty()),
        );
        debug!(
            "loaded {} extra stopwords from {}",
            stop.len() - before,
            path.display()
        );
    }
    Ok(stop)
}

/// Counts words across the cleaned corpus, most frequent first (ties alphabetical),
/// keeping at most `max_words`.
pub fn word_frequencies<S: AsRef<str>>(
    cleaned: &[S],
    stopwords: &HashSet<String>,
    max_words: usize,
) -> Result<Vec<(String, u32)>> {
    let corpus = cleaned
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<&str>>()
        .join(" ");
    let mut frequency: HashMap<&str, u32> = HashMap::new();
    for word in tokens(&corpus).filter(|w| !stopwords.contains(*w)) {
        *frequency.entry(word).or_insert(0) += 1;
    }
    if frequency.is_empty() {
        return Err(Error::EmptyCorpus);
    }
    let mut sorted: Vec<(String, u32)> = frequency
        .into_iter()
        .map(|(w, c)| (w.to_string(), c))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(max_words);
    Ok(sorted)
}

/// A word with its final position (top-left, pixels) and size.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub count: u32,
    pub font_size: f64,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub color: (u8, u8, u8),
}

/// Occupancy grid with a summed-area table for O(1) rectangle queries.
struct Occupancy {
    cols: usize,
    rows: usize,
    filled: Vec<bool>,
    integral: Vec<u32>,
}

impl Occupancy {
    fn new(cols: usize, rows: usize) -> Self {
        Occupancy {
            cols,
            rows,
            filled: vec![false; cols * rows],
            integral: vec![0; (cols + 1) * (rows + 1)],
        }
    }

    fn is_free(&self, col: usize, row: usize, w: usize, h: usize) -> bool {
        let stride = self.cols + 1;
        let at = |c: usize, r: usize| self.integral[r * stride + c];
        at(col + w, row + h) + at(col, row) == at(col + w, row) + at(col, row + h)
    }

    fn fill(&mut self, col: usize, row: usize, w: usize, h: usize) {
        for r in row..row + h {
            for c in col..col + w {
                self.filled[r * self.cols + c] = true;
            }
        }
        let stride = self.cols + 1;
        for r in 0..self.rows {
            let mut line = 0;
            for c in 0..self.cols {
                line += u32::from(self.filled[r * self.cols + c]);
                self.integral[(r + 1) * stride + c + 1] = self.integral[r * stride + c + 1] + line;
            }
        }
    }

    /// Walks an Archimedean spiral out from `start` and returns the first free cell.
    fn find_spot(&self, start: (usize, usize), w: usize, h: usize) -> Option<(usize, usize)> {
        if w > self.cols || h > self.rows {
            return None;
        }
        let max_col = (self.cols - w) as f64;
        let max_row = (self.rows - h) as f64;
        let limit = self.cols.max(self.rows) as f64 * 1.5;
        let mut theta: f64 = 0.0;
        loop {
            let radius = 0.4 * theta;
            if radius > limit {
                return None;
            }
            let col = (start.0 as f64 + radius * theta.cos()).round();
            let row = (start.1 as f64 + radius * theta.sin()).round();
            if (0.0..=max_col).contains(&col) && (0.0..=max_row).contains(&row) {
                let (col, row) = (col as usize, row as usize);
                if self.is_free(col, row, w, h) {
                    return Some((col, row));
                }
            }
            theta += 0.2;
        }
    }
}

/// Places words largest first. `measure(word, font_size)` returns the text's
/// pixel box; a word that fits nowhere shrinks by 10% per attempt and is
/// dropped below `min_font_size`.
pub fn layout_words<R, M>(
    frequencies: &[(String, u32)],
    config: &WordCloudConfig,
    rng: &mut R,
    mut measure: M,
) -> Result<Vec<PlacedWord>>
where
    R: Rng,
    M: FnMut(&str, f64) -> Result<(u32, u32)>,
{
    let cols = (config.width / CELL) as usize;
    let rows = (config.height / CELL) as usize;
    let mut grid = Occupancy::new(cols, rows);
    let mut placed = Vec::new();

    let Some(&(_, top_count)) = frequencies.first() else {
        return Ok(placed);
    };
    let mut max_size = config.max_font_size.unwrap_or(config.height as f64);

    for (i, (word, count)) in frequencies.iter().enumerate() {
        let mut size = max_size * f64::from(*count) / f64::from(top_count);
        while size >= config.min_font_size {
            let (w_px, h_px) = measure(word.as_str(), size)?;
            let w = w_px.div_ceil(CELL) as usize + 1;
            let h = h_px.div_ceil(CELL) as usize + 1;
            if w <= cols && h <= rows {
                let start = (rng.gen_range(0..=cols - w), rng.gen_range(0..=rows - h));
                if let Some((col, row)) = grid.find_spot(start, w, h) {
                    grid.fill(col, row, w, h);
                    placed.push(PlacedWord {
                        word: word.clone(),
                        count: *count,
                        font_size: size,
                        x: (col as u32 * CELL) as i32,
                        y: (row as u32 * CELL) as i32,
                        width: w_px,
                        height: h_px,
                        color: PALETTE[rng.gen_range(0..PALETTE.len())],
                    });
                    break;
                }
            }
            size *= 0.9;
        }
        // Only the most frequent word rescales the rest, and only if it fit.
        if i == 0 {
            if let Some(first) = placed.first() {
                max_size = first.font_size;
            }
        }
    }
    info!(
        "word cloud placed {} of {} words",
        placed.len(),
        frequencies.len()
    );
    Ok(placed)
}

fn font(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
}

/// Pixel box of `word` in the registered sans-serif font.
fn measure_text(word: &str, size: f64) -> Result<(u32, u32)> {
    let (w, h) = font(size).box_size(word).map_err(Error::render)?;
    Ok((w.max(1), h.max(1)))
}

/// Lays out `frequencies` with the registered sans-serif font and writes a PNG.
/// Requires [`crate::fonts::register`] to have succeeded.
pub fn render_word_cloud(
    frequencies: &[(String, u32)],
    config: &WordCloudConfig,
    path: &Path,
) -> Result<Vec<PlacedWord>> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let placed = layout_words(frequencies, config, &mut rng, measure_text)?;

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(Error::render)?;
    for w in &placed {
        let (r, g, b) = w.color;
        let style = font(w.font_size).color(&RGBColor(r, g, b));
        root.draw(&Text::new(w.word.as_str(), (w.x, w.y), style))
            .map_err(Error::render)?;
    }
    root.present().map_err(Error::render)?;
    info!("wrote word cloud to {}", path.display());
    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed-pitch stand-in for real font metrics.
    fn monospace(word: &str, size: f64) -> Result<(u32, u32)> {
        Ok(((word.len() as f64 * size * 0.6).ceil() as u32, size.ceil() as u32))
    }

    fn overlaps(a: &PlacedWord, b: &PlacedWord) -> bool {
        let (aw, ah) = (a.width as i32, a.height as i32);
        let (bw, bh) = (b.width as i32, b.height as i32);
        a.x < b.x + bw && b.x < a.x + aw && a.y < b.y + bh && b.y < a.y + ah
    }

    #[test]
    fn frequencies_are_sorted_and_filtered() {
        let stop = load_stopwords(None).unwrap();
        let cleaned = ["the cat sat", "the cat ran", "a dog ran", "cat"];
        let freqs = word_frequencies(&cleaned, &stop, 10).unwrap();
        assert_eq!(
            freqs,
            vec![
                ("cat".to_string(), 3),
                ("ran".to_string(), 2),
                ("dog".to_string(), 1),
                ("sat".to_string(), 1),
            ]
        );
        let top1 = word_frequencies(&cleaned, &stop, 1).unwrap();
        assert_eq!(top1.len(), 1);
    }

    #[test]
    fn empty_corpus_is_an_error() {
        let stop = load_stopwords(None).unwrap();
        assert!(matches!(
            word_frequencies(&["", "the and", "a"], &stop, 200),
            Err(Error::EmptyCorpus)
        ));
    }

    #[test]
    fn extra_stopwords_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop.txt");
        fs::write(&path, "Cat\n\n  dog \n").unwrap();
        let stop = load_stopwords(Some(&path)).unwrap();
        assert!(stop.contains("cat") && stop.contains("dog") && stop.contains("the"));
        let freqs = word_frequencies(&["cat dog bird"], &stop, 10).unwrap();
        assert_eq!(freqs, vec![("bird".to_string(), 1)]);
    }

    #[test]
    fn layout_stays_inside_canvas_without_overlap() {
        let config = WordCloudConfig::default();
        let freqs: Vec<(String, u32)> = (0..60)
            .map(|i| (format!("word{i}"), 60 - i as u32))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let placed = layout_words(&freqs, &config, &mut rng, monospace).unwrap();

        assert!(!placed.is_empty());
        assert_eq!(placed[0].word, "word0");
        for (i, a) in placed.iter().enumerate() {
            assert!(a.x >= 0 && a.y >= 0);
            assert!(a.x as u32 + a.width <= config.width);
            assert!(a.y as u32 + a.height <= config.height);
            for b in &placed[i + 1..] {
                assert!(!overlaps(a, b), "{} overlaps {}", a.word, b.word);
            }
        }
    }

    #[test]
    fn layout_with_font_metrics_stays_inside_canvas() {
        let Some(path) = crate::fonts::find_system_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        crate::fonts::register(Some(&path)).unwrap();

        let config = WordCloudConfig::default();
        let freqs: Vec<(String, u32)> = ["great", "awful", "tonight", "traffic", "coffee", "game"]
            .iter()
            .cycle()
            .take(40)
            .enumerate()
            .map(|(i, w)| (format!("{w}{i}"), 40 - i as u32))
            .collect();
        let mut rng = StdRng::seed_from_u64(11);
        let placed = layout_words(&freqs, &config, &mut rng, measure_text).unwrap();

        assert!(!placed.is_empty());
        assert_eq!(placed[0].word, "great0");
        for (i, a) in placed.iter().enumerate() {
            assert!(a.x >= 0 && a.y >= 0);
            assert!(a.x as u32 + a.width <= config.width, "{} too wide", a.word);
            assert!(a.y as u32 + a.height <= config.height, "{} too tall", a.word);
            for b in &placed[i + 1..] {
                assert!(!overlaps(a, b), "{} overlaps {}", a.word, b.word);
            }
        }
    }

    #[test]
    fn dropped_top_word_does_not_rescale_the_rest() {
        let config = WordCloudConfig {
            max_font_size: Some(80.0),
            ..WordCloudConfig::default()
        };
        // Too long to fit even at the minimum size.
        let freqs = vec![
            ("x".repeat(400), 4),
            ("big".to_string(), 2),
            ("small".to_string(), 1),
        ];
        let mut rng = StdRng::seed_from_u64(5);
        let placed = layout_words(&freqs, &config, &mut rng, monospace).unwrap();
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].word, "big");
        assert!((placed[0].font_size - 40.0).abs() < 1e-9);
        assert!((placed[1].font_size - 20.0).abs() < 1e-9);
    }

    #[test]
    fn size_follows_frequency() {
        let config = WordCloudConfig {
            max_font_size: Some(80.0),
            ..WordCloudConfig::default()
        };
        let freqs = vec![("big".to_string(), 4), ("small".to_string(), 1)];
        let mut rng = StdRng::seed_from_u64(1);
        let placed = layout_words(&freqs, &config, &mut rng, monospace).unwrap();
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].font_size, 80.0);
        assert!((placed[1].font_size - 20.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_layout() {
        let config = WordCloudConfig::default();
        let freqs = vec![("alpha".to_string(), 3), ("beta".to_string(), 2)];
        let a = layout_words(&freqs, &config, &mut StdRng::seed_from_u64(3), monospace).unwrap();
        let b = layout_words(&freqs, &config, &mut StdRng::seed_from_u64(3), monospace).unwrap();
        assert_eq!(a, b);
    }
}
