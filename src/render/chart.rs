//! SVG Gantt chart drawing with plotters.

use super::RenderPlan;
use anyhow::{anyhow, Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

/// Height of a bar in rank units.
const BAR_HEIGHT: f64 = 0.6;

const X_DESC: &str = "Time (seconds from local process start)";
const Y_DESC: &str = "MPI Rank (Process Number)";

/// Size and title of the chart.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 800,
            title: "MPI Execution Gantt Chart (Normalized)".to_string(),
        }
    }
}

impl From<&crate::config::ChartSettings> for ChartOptions {
    fn from(settings: &crate::config::ChartSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            title: settings.title.clone(),
        }
    }
}

/// Draw the plan into an SVG file.
pub fn render_svg_file(path: &Path, plan: &RenderPlan, options: &ChartOptions) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let root = SVGBackend::new(path, (options.width, options.height)).into_drawing_area();
    draw_plan(&root, plan, options)
        .map_err(|e| anyhow!("Failed to draw chart {}: {:?}", path.display(), e))?;
    root.present()
        .map_err(|e| anyhow!("Failed to write chart {}: {:?}", path.display(), e))?;

    Ok(())
}

/// Draw the plan into an in-memory SVG document.
#[allow(dead_code)] // In-memory counterpart of render_svg_file
pub fn render_svg_string(plan: &RenderPlan, options: &ChartOptions) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        draw_plan(&root, plan, options).map_err(|e| anyhow!("Failed to draw chart: {:?}", e))?;
        root.present()
            .map_err(|e| anyhow!("Failed to finish chart: {:?}", e))?;
    }
    Ok(svg)
}

/// Draw bars, axes and legend onto any plotters backend.
fn draw_plan<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    plan: &RenderPlan,
    options: &ChartOptions,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let (min_rank, max_rank) = plan.rank_bounds().unwrap_or((0, 0));
    // Ticks only at ranks that have a lane.
    let y_range = ((min_rank as f64 - 0.5)..(max_rank as f64 + 0.5))
        .with_key_points(plan.rows.iter().map(|(rank, _)| *rank as f64).collect());
    let x_max = if plan.x_max > 0.0 { plan.x_max * 1.02 } else { 1.0 };

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(110)
        .build_cartesian_2d(0f64..x_max, y_range)?;

    let labels: BTreeMap<u32, &str> = plan
        .rows
        .iter()
        .map(|(rank, label)| (*rank, label.as_str()))
        .collect();
    let row_label = |y: &f64| {
        let nearest = y.round();
        if nearest < 0.0 || (y - nearest).abs() > 1e-6 {
            return String::new();
        }
        labels
            .get(&(nearest as u32))
            .map(|label| label.to_string())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc(X_DESC)
        .y_desc(Y_DESC)
        .y_label_formatter(&row_label)
        .x_label_formatter(&|x| format!("{:.2}", x))
        .draw()?;

    for (idx, bar) in plan.bars.iter().enumerate() {
        let (r, g, b) = bar.color;
        let color = RGBColor(r, g, b);
        let y = bar.rank as f64;
        let corners = [
            (bar.left, y - BAR_HEIGHT / 2.0),
            (bar.left + bar.width, y + BAR_HEIGHT / 2.0),
        ];

        let series = chart.draw_series(std::iter::once(Rectangle::new(
            corners,
            color.mix(0.9).filled(),
        )))?;
        if let Some(entry) = plan.legend_for_bar(idx) {
            series
                .label(entry.phase.to_string())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
        }

        chart.draw_series(std::iter::once(Rectangle::new(
            corners,
            BLACK.stroke_width(1),
        )))?;
    }

    if !plan.legend.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    Ok(())
}
