//! Sentiment tallies and the pie chart.

use std::f64::consts::PI;
use std::path::Path;

use log::info;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::table::Sentiment;

pub const TITLE: &str = "Sentiment Distribution (Negative vs Positive)";

/// Counts of predicted labels. Missing categories count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentDistribution {
    pub negative: usize,
    pub positive: usize,
}

impl SentimentDistribution {
    pub fn from_predictions(predictions: &[Sentiment]) -> Self {
        predictions
            .iter()
            .fold(SentimentDistribution::default(), |mut acc, s| {
                match s {
                    Sentiment::Negative => acc.negative += 1,
                    Sentiment::Positive => acc.positive += 1,
                }
                acc
            })
    }

    pub fn total(&self) -> usize {
        self.negative + self.positive
    }

    /// Slice sizes in chart order: negative, positive.
    pub fn sizes(&self) -> [usize; 2] {
        [self.negative, self.positive]
    }

    pub fn slice_labels(&self) -> [String; 2] {
        [
            format!("Negative (0): {}", self.negative),
            format!("Positive (1): {}", self.positive),
        ]
    }

    /// The two plain-text count lines shown under the chart.
    pub fn summary_lines(&self) -> [String; 2] {
        [
            format!("Negative Sentiment: {}", self.negative),
            format!("Positive Sentiment: {}", self.positive),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct PieConfig {
    pub width: u32,
    pub height: u32,
    /// Degrees, counter-clockwise from the positive x axis.
    pub start_angle: f64,
    /// Outward offset per slice as a fraction of the radius.
    pub explode: [f64; 2],
    pub colors: [(u8, u8, u8); 2],
    pub title_height: u32,
}

impl Default for PieConfig {
    fn default() -> Self {
        PieConfig {
            width: 1000,
            height: 600,
            start_angle: 140.0,
            explode: [0.1, 0.0],
            colors: [(0xff, 0x99, 0x99), (0x66, 0xb3, 0xff)],
            title_height: 50,
        }
    }
}

/// Geometry of one drawn wedge, in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub percent_label: String,
    pub fraction: f64,
    pub start_deg: f64,
    pub end_deg: f64,
    pub center: (f64, f64),
    pub radius: f64,
    pub color: (u8, u8, u8),
    pub label_pos: (f64, f64),
    pub percent_pos: (f64, f64),
}

impl PieSlice {
    fn mid_rad(&self) -> f64 {
        (self.start_deg + self.end_deg) / 2.0 * PI / 180.0
    }

    /// Wedge outline: center, then the arc in steps of at most one degree.
    pub fn outline(&self) -> Vec<(i32, i32)> {
        let steps = (self.end_deg - self.start_deg).abs().ceil().max(1.0) as usize;
        let mut points = vec![to_px(self.center)];
        for i in 0..=steps {
            let deg = self.start_deg + (self.end_deg - self.start_deg) * i as f64 / steps as f64;
            points.push(to_px(polar(self.center, self.radius, deg * PI / 180.0)));
        }
        points
    }
}

fn polar(center: (f64, f64), r: f64, rad: f64) -> (f64, f64) {
    // screen y grows downwards
    (center.0 + r * rad.cos(), center.1 - r * rad.sin())
}

fn to_px(p: (f64, f64)) -> (i32, i32) {
    (p.0.round() as i32, p.1.round() as i32)
}

/// Lays out both slices counter-clockwise from `start_angle`. An empty
/// category keeps a zero-width slice so its label is still drawn.
pub fn pie_slices(dist: &SentimentDistribution, config: &PieConfig) -> Vec<PieSlice> {
    let total = dist.total();
    if total == 0 {
        return Vec::new();
    }
    let plot_height = config.height.saturating_sub(config.title_height) as f64;
    let radius = (config.width as f64).min(plot_height) * 0.36;
    let origin = (
        config.width as f64 / 2.0,
        config.title_height as f64 + plot_height / 2.0,
    );

    let labels = dist.slice_labels();
    let mut slices = Vec::new();
    let mut angle = config.start_angle;
    for (i, size) in dist.sizes().into_iter().enumerate() {
        let fraction = size as f64 / total as f64;
        let (start, end) = (angle, angle + 360.0 * fraction);
        angle = end;
        let mid = (start + end) / 2.0 * PI / 180.0;
        let center = polar(origin, config.explode[i] * radius, mid);
        slices.push(PieSlice {
            label: labels[i].clone(),
            percent_label: format!("{:.1}%", fraction * 100.0),
            fraction,
            start_deg: start,
            end_deg: end,
            center,
            radius,
            color: config.colors[i],
            label_pos: polar(center, 1.1 * radius, mid),
            percent_pos: polar(center, 0.6 * radius, mid),
        });
    }
    slices
}

/// Draws the pie chart to a PNG. Requires [`crate::fonts::register`].
pub fn render_pie_chart(dist: &SentimentDistribution, config: &PieConfig, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(Error::render)?;

    let title = FontDesc::new(FontFamily::SansSerif, 22.0, FontStyle::Bold)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    root.draw(&Text::new(
        TITLE,
        (config.width as i32 / 2, config.title_height as i32 / 2),
        title,
    ))
    .map_err(Error::render)?;

    let text = FontDesc::new(FontFamily::SansSerif, 17.0, FontStyle::Normal).color(&BLACK);
    for slice in pie_slices(dist, config) {
        if slice.fraction > 0.0 {
            let (r, g, b) = slice.color;
            root.draw(&Polygon::new(slice.outline(), RGBColor(r, g, b).filled()))
                .map_err(Error::render)?;
        }

        let h = if slice.mid_rad().cos() >= 0.0 {
            HPos::Left
        } else {
            HPos::Right
        };
        root.draw(&Text::new(
            slice.label.as_str(),
            to_px(slice.label_pos),
            text.pos(Pos::new(h, VPos::Center)),
        ))
        .map_err(Error::render)?;
        root.draw(&Text::new(
            slice.percent_label.as_str(),
            to_px(slice.percent_pos),
            text.pos(Pos::new(HPos::Center, VPos::Center)),
        ))
        .map_err(Error::render)?;
    }
    root.present().map_err(Error::render)?;
    info!("wrote sentiment pie chart to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[u8]) -> Vec<Sentiment> {
        raw.iter().filter_map(|&l| Sentiment::from_label(l)).collect()
    }

    fn dist(raw: &[u8]) -> SentimentDistribution {
        SentimentDistribution::from_predictions(&labels(raw))
    }

    #[test]
    fn counts_both_buckets() {
        let d = dist(&[1, 0, 1, 1, 0]);
        assert_eq!(d.negative, 2);
        assert_eq!(d.positive, 3);
        assert_eq!(d.sizes().iter().sum::<usize>(), 5);
        assert_eq!(d.summary_lines()[0], "Negative Sentiment: 2");
        assert_eq!(d.slice_labels()[1], "Positive (1): 3");
    }

    #[test]
    fn missing_category_defaults_to_zero() {
        let d = dist(&[1, 1, 1]);
        assert_eq!(d, SentimentDistribution { negative: 0, positive: 3 });
        let slices = pie_slices(&d, &PieConfig::default());
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, "Negative (0): 0");
        assert_eq!(slices[0].percent_label, "0.0%");
        assert_eq!(slices[0].start_deg, slices[0].end_deg);
        assert_eq!(slices[1].percent_label, "100.0%");
        assert!((slices[1].end_deg - slices[1].start_deg - 360.0).abs() < 1e-9);
    }

    #[test]
    fn slices_sweep_counter_clockwise_from_start_angle() {
        let config = PieConfig::default();
        let slices = pie_slices(&dist(&[1, 0, 1, 1]), &config);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, "Negative (0): 1");
        assert_eq!(slices[0].start_deg, 140.0);
        assert!((slices[0].end_deg - 230.0).abs() < 1e-9);
        assert!((slices[1].end_deg - 500.0).abs() < 1e-9);
        assert_eq!(slices[0].percent_label, "25.0%");
        assert_eq!(slices[1].percent_label, "75.0%");
        let total: f64 = slices.iter().map(|s| s.fraction).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn only_negative_slice_is_exploded() {
        let config = PieConfig::default();
        let slices = pie_slices(&dist(&[1, 0]), &config);
        let origin = (500.0, 50.0 + 275.0);
        let offset = |s: &PieSlice| ((s.center.0 - origin.0).powi(2) + (s.center.1 - origin.1).powi(2)).sqrt();
        assert!((offset(&slices[0]) - 0.1 * slices[0].radius).abs() < 1e-6);
        assert!(offset(&slices[1]) < 1e-9);
    }

    #[test]
    fn outline_starts_at_center_and_follows_arc() {
        let slices = pie_slices(&dist(&[0, 1]), &PieConfig::default());
        let outline = slices[1].outline();
        assert_eq!(outline[0], to_px(slices[1].center));
        assert_eq!(outline.len(), 180 + 2);
    }

    #[test]
    fn empty_distribution_has_no_slices() {
        assert!(pie_slices(&SentimentDistribution::default(), &PieConfig::default()).is_empty());
    }
}
