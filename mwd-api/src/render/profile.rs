//! Depth profile charts: one sensor channel against depth for one hole

use std::collections::BTreeMap;

use mwd_common::{Feature, MwdSample};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Serialize;

use super::{padded_range, render_svg, RenderError, RenderResult};

const PROFILE_SIZE: (u32, u32) = (640, 480);

/// All five profiles of one hole plus its drilled depth span
#[derive(Debug, Clone, Serialize)]
pub struct HoleProfiles {
    #[serde(rename = "holeID")]
    pub hole_id: String,
    /// Deepest minus shallowest sample depth
    pub depth: f64,
    /// Base64 SVG per feature column name
    #[serde(flatten)]
    pub images: BTreeMap<String, String>,
}

/// Profile of `feature` for `samples` of a single hole, titled with the hole id
pub fn feature_profile(hole_id: &str, samples: &[MwdSample], feature: Feature) -> RenderResult<String> {
    let title = format!("Hole: {}", hole_id);
    render_profile(&title, samples, feature)
}

/// Every feature profile of one hole
pub fn hole_profiles(hole_id: &str, samples: &[MwdSample]) -> RenderResult<HoleProfiles> {
    if samples.is_empty() {
        return Err(RenderError::Empty(format!("hole {} has no samples", hole_id)));
    }

    let mut images = BTreeMap::new();
    for feature in Feature::ALL {
        let title = format!("{}: {}", hole_id, feature);
        images.insert(feature.column_name().to_string(), render_profile(&title, samples, feature)?);
    }

    Ok(HoleProfiles {
        hole_id: hole_id.to_string(),
        depth: depth_span(samples),
        images,
    })
}

pub(crate) fn depth_span(samples: &[MwdSample]) -> f64 {
    let (lo, hi) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.depth), hi.max(s.depth))
        });
    if lo > hi {
        0.0
    } else {
        hi - lo
    }
}

fn render_profile(title: &str, samples: &[MwdSample], feature: Feature) -> RenderResult<String> {
    let points: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| (s.feature(feature), s.depth))
        .collect();
    render_svg(PROFILE_SIZE, |root| draw_profile(root, title, feature, &points))
}

fn draw_profile<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    feature: Feature,
    points: &[(f64, f64)],
) -> RenderResult<()> {
    root.fill(&WHITE)?;

    let x_range = padded_range(points.iter().map(|p| p.0));
    let depth = padded_range(points.iter().map(|p| p.1));

    // Depth grows downward
    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, depth.end..depth.start)?;

    chart.plotting_area().fill(&BLACK)?;
    chart
        .configure_mesh()
        .light_line_style(&BLACK)
        .bold_line_style(&WHITE.mix(0.15))
        .x_desc(feature.column_name())
        .y_desc("Depth")
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &CYAN))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn sample(depth: f64, rate: f64) -> MwdSample {
        MwdSample {
            project_id: "p1".to_string(),
            sample_index: 0,
            hole_id: "H1".to_string(),
            depth,
            penetr_rate: rate,
            perc_pressure: 2.0,
            feed_pressure: 3.0,
            rot_pressure: 4.0,
            inst_rot_pressure: 5.0,
            time: None,
        }
    }

    fn decode(image: &str) -> String {
        String::from_utf8(STANDARD.decode(image).unwrap()).unwrap()
    }

    #[test]
    fn test_feature_profile_is_titled_with_hole() {
        let samples = vec![sample(0.5, 1.0), sample(1.0, 1.4), sample(1.5, 0.8)];
        let svg = decode(&feature_profile("H1", &samples, Feature::PenetrRate).unwrap());
        assert!(svg.contains("Hole: H1"));
        assert!(svg.contains("PenetrRate"));
    }

    #[test]
    fn test_hole_profiles_cover_every_feature() {
        let samples = vec![sample(2.0, 1.0), sample(0.5, 1.4), sample(3.5, 0.8)];
        let profiles = hole_profiles("H1", &samples).unwrap();
        assert_eq!(profiles.images.len(), 5);
        assert!((profiles.depth - 3.0).abs() < 1e-12);

        let json = serde_json::to_value(&profiles).unwrap();
        assert_eq!(json["holeID"], "H1");
        assert!(json["InstRotPressure"].is_string());
    }

    #[test]
    fn test_single_sample_profile_renders() {
        let samples = vec![sample(1.0, 1.0)];
        assert!(feature_profile("H1", &samples, Feature::RotPressure).is_ok());
        assert_eq!(hole_profiles("H1", &samples).unwrap().depth, 0.0);
    }

    #[test]
    fn test_empty_hole_is_rejected() {
        assert!(matches!(hole_profiles("H9", &[]), Err(RenderError::Empty(_))));
    }
}
