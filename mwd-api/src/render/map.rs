//! Plan view of hole collars

use mwd_common::HolePosition;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::{padded_range, render_svg, RenderError, RenderResult};

const MAP_SIZE: (u32, u32) = (800, 800);

/// Collar map of one project, each hole marked and labeled with its id
pub fn hole_map(project_id: &str, positions: &[HolePosition]) -> RenderResult<String> {
    if positions.is_empty() {
        return Err(RenderError::Empty(format!(
            "project {} has no hole positions",
            project_id
        )));
    }
    let title = format!("Hole locations: {}", project_id);
    render_svg(MAP_SIZE, |root| draw_map(root, &title, positions))
}

fn draw_map<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    positions: &[HolePosition],
) -> RenderResult<()> {
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            padded_range(positions.iter().map(|p| p.easting)),
            padded_range(positions.iter().map(|p| p.northing)),
        )?;

    chart
        .configure_mesh()
        .x_desc("Easting")
        .y_desc("Northing")
        .draw()?;

    chart.draw_series(positions.iter().map(|p| {
        EmptyElement::at((p.easting, p.northing))
            + Circle::new((0, 0), 4, BLUE.filled())
            + Text::new(p.hole_id.clone(), (6, -12), ("sans-serif", 12).into_font())
    }))?;

    Ok(())
}
