//! Chart export: JSON (serde) and PNG/SVG (plotters).

use color_eyre::eyre::eyre;
use color_eyre::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use scoutplot_cli::OutputFormat;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::chart_data::{format_axis_label, ChartBounds, ChartSpec, LineOrientation};
use crate::config::ColorParser;
use crate::filter::RowTag;

/// Dashes drawn along each reference line.
const DASH_COUNT: usize = 40;
const POINT_RADIUS: i32 = 4;
const HIGHLIGHT_RADIUS: i32 = 6;

/// Write the chart spec as pretty-printed JSON.
pub fn write_chart_json<W: Write>(mut writer: W, spec: &ChartSpec) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, spec)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write the chart to `path` in the given format. Size is (width, height) in pixels.
pub fn write_chart(
    path: &Path,
    spec: &ChartSpec,
    format: OutputFormat,
    size: (u32, u32),
) -> Result<()> {
    debug!(path = %path.display(), format = format.extension(), "exporting chart");
    match format {
        OutputFormat::Json => write_chart_json(BufWriter::new(File::create(path)?), spec),
        OutputFormat::Png => write_chart_png(path, spec, size),
        OutputFormat::Svg => write_chart_svg(path, spec, size),
    }
}

/// Write chart to PNG using plotters bitmap backend.
pub fn write_chart_png(path: &Path, spec: &ChartSpec, (width, height): (u32, u32)) -> Result<()> {
    let bounds = export_bounds(spec)?;
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    draw_scatter(&root, spec, bounds)?;
    root.present()?;
    Ok(())
}

/// Write chart to SVG using plotters SVG backend.
pub fn write_chart_svg(path: &Path, spec: &ChartSpec, (width, height): (u32, u32)) -> Result<()> {
    let bounds = export_bounds(spec)?;
    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    draw_scatter(&root, spec, bounds)?;
    root.present()?;
    Ok(())
}

fn export_bounds(spec: &ChartSpec) -> Result<ChartBounds> {
    spec.bounds().ok_or_else(|| eyre!("No data to export"))
}

fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    bounds: ChartBounds,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let parser = ColorParser::new();
    let normal = parser.parse(spec.palette.color_for(RowTag::Normal))?;
    let highlighted = parser.parse(spec.palette.color_for(RowTag::Highlighted))?;

    root.fill(&WHITE)?;

    let mut binding = ChartBuilder::on(root);
    let builder = binding.margin(30);
    let builder = if spec.title.text.is_empty() {
        builder
    } else {
        builder.caption(spec.title.text.as_str(), ("sans-serif", 20))
    };
    let mut chart = builder
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(bounds.x_min..bounds.x_max, bounds.y_min..bounds.y_max)?;

    let formatter = |v: &f64| format_axis_label(*v);
    chart
        .configure_mesh()
        .x_desc(spec.x_axis.title.as_str())
        .y_desc(spec.y_axis.title.as_str())
        .x_label_formatter(&formatter)
        .y_label_formatter(&formatter)
        .draw()?;

    for line in &spec.reference_lines {
        let style = parser.parse(&line.color)?.stroke_width(line.width);
        let segments: Vec<[(f64, f64); 2]> = match line.orientation {
            LineOrientation::Vertical => dash_intervals(bounds.y_min, bounds.y_max)
                .into_iter()
                .map(|(a, b)| [(line.value, a), (line.value, b)])
                .collect(),
            LineOrientation::Horizontal => dash_intervals(bounds.x_min, bounds.x_max)
                .into_iter()
                .map(|(a, b)| [(a, line.value), (b, line.value)])
                .collect(),
        };
        chart.draw_series(
            segments
                .into_iter()
                .map(|segment| PathElement::new(segment.to_vec(), style)),
        )?;
    }

    // Highlighted points go last so they sit on top.
    chart.draw_series(
        spec.points
            .iter()
            .filter(|p| p.tag == RowTag::Normal)
            .map(|p| Circle::new((p.x, p.y), POINT_RADIUS, normal.filled())),
    )?;
    chart.draw_series(spec.highlighted_points().map(|p| {
        EmptyElement::at((p.x, p.y))
            + Circle::new((0, 0), HIGHLIGHT_RADIUS, highlighted.filled())
            + Text::new(
                p.label.clone(),
                (HIGHLIGHT_RADIUS + 2, -HIGHLIGHT_RADIUS - 2),
                ("sans-serif", 14).into_font(),
            )
    }))?;

    Ok(())
}

/// Start/end pairs of the dashes along [from, to]; gaps are as long as dashes.
fn dash_intervals(from: f64, to: f64) -> Vec<(f64, f64)> {
    let step = (to - from) / (DASH_COUNT * 2 - 1) as f64;
    (0..DASH_COUNT)
        .map(|i| {
            let start = from + (2 * i) as f64 * step;
            (start, start + step)
        })
        .collect()
}
