//! Rock hardness bands along a hole
//!
//! Penetration rate is inversely related to rock strength. Samples are split
//! into terciles of penetration rate within the hole: the slowest third is
//! `hard`, the fastest third `soft`, the rest `medium`.

use mwd_common::MwdSample;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Serialize;

use super::{padded_range, render_svg, RenderError, RenderResult};

const HARDNESS_SIZE: (u32, u32) = (640, 640);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Hardness {
    Hard,
    Medium,
    Soft,
}

impl Hardness {
    fn color(self) -> RGBColor {
        match self {
            Hardness::Hard => RGBColor(178, 34, 34),
            Hardness::Medium => RGBColor(218, 165, 32),
            Hardness::Soft => RGBColor(60, 179, 113),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Hardness::Hard => "Hard",
            Hardness::Medium => "Medium",
            Hardness::Soft => "Soft",
        }
    }
}

/// Classification of one sample, plus the depth interval it stands for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardnessBand {
    #[serde(rename = "Depth")]
    pub depth: f64,
    #[serde(rename = "PenetrRate")]
    pub penetr_rate: f64,
    pub hardness: Hardness,
    pub top: f64,
    pub bottom: f64,
}

/// Classify the samples of one hole, returned in increasing depth order
///
/// Each band reaches halfway to the neighboring samples.
pub fn classify_hardness(samples: &[MwdSample]) -> Vec<HardnessBand> {
    let mut rates: Vec<f64> = samples.iter().map(|s| s.penetr_rate).collect();
    rates.sort_by(f64::total_cmp);
    let lower = quantile(&rates, 1.0 / 3.0);
    let upper = quantile(&rates, 2.0 / 3.0);

    let mut ordered: Vec<&MwdSample> = samples.iter().collect();
    ordered.sort_by(|a, b| a.depth.total_cmp(&b.depth));

    ordered
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let hardness = if s.penetr_rate <= lower {
                Hardness::Hard
            } else if s.penetr_rate < upper {
                Hardness::Medium
            } else {
                Hardness::Soft
            };
            let top = match i {
                0 => s.depth,
                _ => (ordered[i - 1].depth + s.depth) / 2.0,
            };
            let bottom = match ordered.get(i + 1) {
                Some(next) => (s.depth + next.depth) / 2.0,
                None => s.depth,
            };
            HardnessBand {
                depth: s.depth,
                penetr_rate: s.penetr_rate,
                hardness,
                top,
                bottom,
            }
        })
        .collect()
}

/// Linear-interpolated quantile of already sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let below = pos.floor() as usize;
            let above = pos.ceil() as usize;
            sorted[below] + (sorted[above] - sorted[below]) * (pos - below as f64)
        }
    }
}

/// Penetration-rate trace over colored hardness bands
pub fn hardness_chart(hole_id: &str, bands: &[HardnessBand]) -> RenderResult<String> {
    if bands.is_empty() {
        return Err(RenderError::Empty(format!("hole {} has no samples", hole_id)));
    }
    let title = format!("Hole: {} hardness", hole_id);
    render_svg(HARDNESS_SIZE, |root| draw_hardness(root, &title, bands))
}

fn draw_hardness<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    bands: &[HardnessBand],
) -> RenderResult<()> {
    root.fill(&WHITE)?;

    let x_range = padded_range(bands.iter().map(|b| b.penetr_rate));
    let depth = padded_range(bands.iter().flat_map(|b| [b.top, b.bottom]));
    let (x_lo, x_hi) = (x_range.start, x_range.end);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, depth.end..depth.start)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("PenetrRate")
        .y_desc("Depth")
        .draw()?;

    for hardness in [Hardness::Hard, Hardness::Medium, Hardness::Soft] {
        let color = hardness.color();
        chart
            .draw_series(
                bands
                    .iter()
                    .filter(|b| b.hardness == hardness)
                    .map(|b| Rectangle::new([(x_lo, b.top), (x_hi, b.bottom)], color.mix(0.35).filled())),
            )?
            .label(hardness.label())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart.draw_series(LineSeries::new(
        bands.iter().map(|b| (b.penetr_rate, b.depth)),
        &BLACK,
    ))?;

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::LowerRight)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(depth: f64, rate: f64) -> MwdSample {
        MwdSample {
            project_id: "p1".to_string(),
            sample_index: 0,
            hole_id: "H1".to_string(),
            depth,
            penetr_rate: rate,
            perc_pressure: 1.0,
            feed_pressure: 1.0,
            rot_pressure: 1.0,
            inst_rot_pressure: 1.0,
            time: None,
        }
    }

    #[test]
    fn test_terciles_split_hard_medium_soft() {
        let samples: Vec<MwdSample> = [(1.0, 0.4), (2.0, 2.0), (3.0, 1.1), (4.0, 0.3), (5.0, 1.8), (6.0, 1.0)]
            .iter()
            .map(|&(d, r)| sample(d, r))
            .collect();
        let bands = classify_hardness(&samples);
        let classes: Vec<Hardness> = bands.iter().map(|b| b.hardness).collect();
        assert_eq!(
            classes,
            vec![
                Hardness::Hard,
                Hardness::Soft,
                Hardness::Medium,
                Hardness::Hard,
                Hardness::Soft,
                Hardness::Medium,
            ]
        );
    }

    #[test]
    fn test_bands_are_depth_ordered_and_contiguous() {
        let samples = vec![sample(3.0, 1.0), sample(1.0, 2.0), sample(2.0, 3.0)];
        let bands = classify_hardness(&samples);
        let depths: Vec<f64> = bands.iter().map(|b| b.depth).collect();
        assert_eq!(depths, vec![1.0, 2.0, 3.0]);
        assert_eq!(bands[0].top, 1.0);
        assert_eq!(bands[0].bottom, 1.5);
        assert_eq!(bands[1].top, 1.5);
        assert_eq!(bands[2].bottom, 3.0);
    }

    #[test]
    fn test_quantile_interpolates() {
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.5), 2.5);
        assert_eq!(quantile(&[7.0], 0.9), 7.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_chart_renders() {
        let samples = vec![sample(1.0, 1.0), sample(2.0, 2.0), sample(3.0, 3.0)];
        let bands = classify_hardness(&samples);
        assert!(hardness_chart("H1", &bands).is_ok());
        assert!(matches!(hardness_chart("H1", &[]), Err(RenderError::Empty(_))));
    }
}
