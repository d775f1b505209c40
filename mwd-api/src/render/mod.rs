//! Chart rendering
//!
//! Every chart is drawn into its own SVG drawing area, which is dropped as
//! soon as the document is complete. Charts leave this module as base64 text
//! ready to embed in a JSON response.

use std::ops::Range;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use thiserror::Error;

pub mod hardness;
pub mod map;
pub mod profile;
pub mod scatter;

pub use hardness::{classify_hardness, hardness_chart, Hardness, HardnessBand};
pub use map::hole_map;
pub use profile::{feature_profile, hole_profiles, HoleProfiles};
pub use scatter::{cluster_scatter, ScatterInput};

/// Media type of every rendered chart
pub const CHART_MEDIA_TYPE: &str = "image/svg+xml";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Chart drawing failed: {0}")]
    Draw(String),

    #[error("Nothing to plot: {0}")]
    Empty(String),
}

impl<E> From<DrawingAreaErrorKind<E>> for RenderError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Draw(err.to_string())
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Draw one chart into a fresh SVG document and return it base64-encoded
pub(crate) fn render_svg<F>(size: (u32, u32), draw: F) -> RenderResult<String>
where
    F: for<'a> FnOnce(&DrawingArea<SVGBackend<'a>, Shift>) -> RenderResult<()>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw(&root)?;
        root.present()?;
    }
    Ok(STANDARD.encode(svg))
}

/// Axis range covering `values` with a 5% margin on each side
pub(crate) fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if lo > hi {
        return 0.0..1.0;
    }
    if lo == hi {
        return (lo - 0.5)..(hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([0.0, 10.0]), -0.5..10.5);
        assert_eq!(padded_range([3.0, 3.0]), 2.5..3.5);
        assert_eq!(padded_range(Vec::new()), 0.0..1.0);
        assert_eq!(padded_range([f64::NAN, 2.0]), 1.5..2.5);
    }

    #[test]
    fn test_render_svg_yields_base64_svg_document() {
        let encoded = render_svg((100, 80), |root| {
            root.fill(&WHITE)?;
            Ok(())
        })
        .unwrap();

        let decoded = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(decoded.contains("<svg"));
        assert!(decoded.contains("</svg>"));
    }
}
