//! 2D cluster scatter: one point per sample, colored by cluster label and
//! sized by depth

use std::collections::BTreeSet;
use std::f64::consts::PI;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{padded_range, render_svg, RenderError, RenderResult};

const SCATTER_SIZE: (u32, u32) = (1400, 1000);

/// Row-aligned inputs of a cluster scatter
#[derive(Debug, Clone)]
pub struct ScatterInput<'a> {
    pub title: String,
    pub axis_labels: [&'a str; 2],
    pub points: Vec<(f64, f64)>,
    pub labels: &'a [usize],
    pub depths: &'a [f64],
}

pub fn cluster_scatter(input: &ScatterInput<'_>) -> RenderResult<String> {
    let rows = input.points.len();
    if rows == 0 {
        return Err(RenderError::Empty("no samples to cluster".to_string()));
    }
    if input.labels.len() != rows || input.depths.len() != rows {
        return Err(RenderError::Draw(format!(
            "scatter inputs disagree: {} points, {} labels, {} depths",
            rows,
            input.labels.len(),
            input.depths.len()
        )));
    }
    render_svg(SCATTER_SIZE, |root| draw_scatter(root, input))
}

/// Marker radius in pixels; marker area grows linearly with depth
fn marker_radius(depth: f64) -> i32 {
    let area = 10.0 + 15.0 * depth.max(0.0);
    ((area / PI).sqrt().round() as i32).clamp(2, 20)
}

fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    input: &ScatterInput<'_>,
) -> RenderResult<()> {
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&input.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(
            padded_range(input.points.iter().map(|p| p.0)),
            padded_range(input.points.iter().map(|p| p.1)),
        )?;

    chart
        .configure_mesh()
        .x_desc(input.axis_labels[0])
        .y_desc(input.axis_labels[1])
        .draw()?;

    let clusters: BTreeSet<usize> = input.labels.iter().copied().collect();
    for cluster in clusters {
        let color = Palette99::pick(cluster).to_rgba();
        let members = input
            .points
            .iter()
            .zip(input.labels)
            .zip(input.depths)
            .filter(|((_, label), _)| **label == cluster)
            .map(|((&point, _), &depth)| Circle::new(point, marker_radius(depth), color.mix(0.6).filled()));

        chart
            .draw_series(members)?
            .label(format!("Cluster {}", cluster))
            .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    Ok(())
}
