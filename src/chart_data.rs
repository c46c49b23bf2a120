//! Quadrant means and the declarative scatter chart specification.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ExploreError, Result};
use crate::filter::{numeric_values, row_tags, RowTag};
use crate::schema::{has_column, AxisSelection};

pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#7a33ff";
pub const DEFAULT_NORMAL_COLOR: &str = "skyblue";
pub const DEFAULT_REFERENCE_LINE_COLOR: &str = "gray";
pub const DEFAULT_REFERENCE_LINE_WIDTH: u32 = 1;
pub const DEFAULT_LEGEND_TITLE: &str = "Player/Team Highlight";

/// Mean of each axis over the filtered rows; the quadrant lines sit here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadrantMeans {
    pub x: f64,
    pub y: f64,
}

/// Arithmetic mean of `x_column` and `y_column` (missing values skipped).
pub fn compute_means(df: &DataFrame, x_column: &str, y_column: &str) -> Result<QuadrantMeans> {
    if df.height() == 0 {
        return Err(ExploreError::EmptyDataset);
    }
    let mean_of = |column: &str| -> Result<f64> {
        if !has_column(df, column) {
            return Err(ExploreError::missing_column(column, "mean"));
        }
        numeric_values(df, column)?
            .mean()
            .ok_or_else(|| ExploreError::NoNumericValues {
                column: column.to_string(),
            })
    };
    Ok(QuadrantMeans {
        x: mean_of(x_column)?,
        y: mean_of(y_column)?,
    })
}

/// Colors, line style and legend text used when building a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    pub highlight_color: String,
    pub normal_color: String,
    pub reference_line_color: String,
    pub reference_line_width: u32,
    pub legend_title: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
            normal_color: DEFAULT_NORMAL_COLOR.to_string(),
            reference_line_color: DEFAULT_REFERENCE_LINE_COLOR.to_string(),
            reference_line_width: DEFAULT_REFERENCE_LINE_WIDTH,
            legend_title: DEFAULT_LEGEND_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleAnchor {
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTitle {
    pub text: String,
    pub anchor: TitleAnchor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub column: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Hover text: the row's player or team.
    pub label: String,
    pub tag: RowTag,
}

/// Two-entry palette keyed by `RowTag`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub highlighted: String,
    pub normal: String,
}

impl Palette {
    pub fn color_for(&self, tag: RowTag) -> &str {
        match tag {
            RowTag::Highlighted => &self.highlighted,
            RowTag::Normal => &self.normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineOrientation {
    /// Constant x.
    Vertical,
    /// Constant y.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Dash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub orientation: LineOrientation,
    pub value: f64,
    pub dash: LineDash,
    pub color: String,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendSpec {
    pub visible: bool,
    pub title: String,
}

/// Renderer-agnostic scatter chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: ChartTitle,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub points: Vec<ScatterPoint>,
    pub palette: Palette,
    pub reference_lines: Vec<ReferenceLine>,
    pub legend: LegendSpec,
}

impl ChartSpec {
    pub fn highlighted_points(&self) -> impl Iterator<Item = &ScatterPoint> {
        self.points.iter().filter(|p| p.tag == RowTag::Highlighted)
    }

    /// Min/max over points and reference lines, padded so no mark sits on the frame.
    pub fn bounds(&self) -> Option<ChartBounds> {
        let mut xs: Vec<f64> = self.points.iter().map(|p| p.x).collect();
        let mut ys: Vec<f64> = self.points.iter().map(|p| p.y).collect();
        if xs.is_empty() {
            return None;
        }
        for line in &self.reference_lines {
            match line.orientation {
                LineOrientation::Vertical => xs.push(line.value),
                LineOrientation::Horizontal => ys.push(line.value),
            }
        }
        let (x_min, x_max) = padded_extent(&xs);
        let (y_min, y_max) = padded_extent(&ys);
        Some(ChartBounds {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }
}

/// Plot area bounds in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

const BOUNDS_PADDING: f64 = 0.05;

fn padded_extent(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > min {
        let pad = (max - min) * BOUNDS_PADDING;
        (min - pad, max + pad)
    } else {
        (min - 1.0, max + 1.0)
    }
}

/// Format a numeric axis tick.
pub fn format_axis_label(v: f64) -> String {
    if v.abs() >= 1e6 || (v.abs() < 1e-2 && v != 0.0) {
        format!("{:.2e}", v)
    } else if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// Build the scatter chart: one point per row with both values present, colored by the
/// row's tag, labelled by `identifier`, with dashed lines at the means.
pub fn build_scatter_spec(
    df: &DataFrame,
    axes: &AxisSelection,
    color_tag_column: &str,
    identifier: &str,
    means: QuadrantMeans,
    style: &ChartStyle,
) -> Result<ChartSpec> {
    for (column, context) in [
        (axes.x.as_str(), "X axis"),
        (axes.y.as_str(), "Y axis"),
        (color_tag_column, "color tag"),
        (identifier, "identifier"),
    ] {
        if !has_column(df, column) {
            return Err(ExploreError::missing_column(column, context));
        }
    }

    let xs = numeric_values(df, &axes.x)?;
    let ys = numeric_values(df, &axes.y)?;
    let tags = row_tags(df, color_tag_column)?;
    let labels_col = df.column(identifier)?.cast(&DataType::String)?;
    let labels = labels_col.str()?;

    let points: Vec<ScatterPoint> = (&xs)
        .into_iter()
        .zip(&ys)
        .zip(labels)
        .zip(tags)
        .filter_map(|(((x, y), label), tag)| {
            let (x, y) = (x?, y?);
            (x.is_finite() && y.is_finite()).then(|| ScatterPoint {
                x,
                y,
                label: label.unwrap_or_default().to_string(),
                tag,
            })
        })
        .collect();

    let reference_line = |orientation, value| ReferenceLine {
        orientation,
        value,
        dash: LineDash::Dash,
        color: style.reference_line_color.clone(),
        width: style.reference_line_width,
    };

    Ok(ChartSpec {
        title: ChartTitle {
            text: format!("{} vs {} Scatterplot", axes.x, axes.y),
            anchor: TitleAnchor::Center,
        },
        x_axis: AxisSpec {
            column: axes.x.clone(),
            title: axes.x.clone(),
        },
        y_axis: AxisSpec {
            column: axes.y.clone(),
            title: axes.y.clone(),
        },
        points,
        palette: Palette {
            highlighted: style.highlight_color.clone(),
            normal: style.normal_color.clone(),
        },
        reference_lines: vec![
            reference_line(LineOrientation::Vertical, means.x),
            reference_line(LineOrientation::Horizontal, means.y),
        ],
        legend: LegendSpec {
            visible: false,
            title: style.legend_title.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{tag_rows, COLOR_TAG_COLUMN};
    use crate::schema::SchemaMode;

    #[test]
    fn means_of_two_rows() {
        let df = df!("x" => &[2_i64, 4], "y" => &[4.0_f64, 8.0]).unwrap();
        assert_eq!(
            compute_means(&df, "x", "y").unwrap(),
            QuadrantMeans { x: 3.0, y: 6.0 }
        );
    }

    #[test]
    fn means_skip_missing_values() {
        let df = df!("x" => &[Some(2.0_f64), None, Some(6.0)], "y" => &[1.0_f64, 2.0, 3.0]).unwrap();
        let means = compute_means(&df, "x", "y").unwrap();
        assert_eq!(means, QuadrantMeans { x: 4.0, y: 2.0 });
    }

    #[test]
    fn means_of_empty_dataset_fail() {
        let df = df!("x" => &[1.0_f64], "y" => &[1.0_f64]).unwrap().head(Some(0));
        assert!(matches!(
            compute_means(&df, "x", "y"),
            Err(ExploreError::EmptyDataset)
        ));
    }

    #[test]
    fn means_of_text_column_fail() {
        let df = df!("x" => &["a", "b"], "y" => &[1.0_f64, 2.0]).unwrap();
        match compute_means(&df, "x", "y") {
            Err(ExploreError::NoNumericValues { column }) => assert_eq!(column, "x"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    fn teams() -> SchemaMode {
        SchemaMode::Team {
            identifier: "Equipo".into(),
        }
    }

    fn tagged_teams() -> DataFrame {
        let df = df!(
            "Equipo" => &["Arsenal", "Chelsea", "Spurs"],
            "Goles" => &[Some(70.0_f64), Some(60.0), None],
            "Tiros" => &[500.0_f64, 450.0, 400.0]
        )
        .unwrap();
        tag_rows(&df, "Equipo", "Chelsea").unwrap()
    }

    #[test]
    fn spec_points_tags_and_labels() {
        let df = tagged_teams();
        let axes = AxisSelection::new(&df, &teams(), "Goles", "Tiros").unwrap();
        let means = QuadrantMeans { x: 65.0, y: 450.0 };
        let spec = build_scatter_spec(
            &df,
            &axes,
            COLOR_TAG_COLUMN,
            "Equipo",
            means,
            &ChartStyle::default(),
        )
        .unwrap();

        assert_eq!(spec.title.text, "Goles vs Tiros Scatterplot");
        assert_eq!(spec.title.anchor, TitleAnchor::Center);
        assert_eq!(spec.x_axis.title, "Goles");
        assert_eq!(spec.y_axis.title, "Tiros");
        // Spurs has no Goles value and is not plotted.
        assert_eq!(spec.points.len(), 2);
        assert_eq!(spec.points[0].label, "Arsenal");
        assert_eq!(spec.points[0].tag, RowTag::Normal);
        assert_eq!(spec.points[1].label, "Chelsea");
        assert_eq!(spec.points[1].tag, RowTag::Highlighted);
        assert_eq!(spec.highlighted_points().count(), 1);
        assert_eq!(spec.palette.color_for(RowTag::Highlighted), "#7a33ff");
        assert_eq!(spec.palette.color_for(RowTag::Normal), "skyblue");
        assert!(!spec.legend.visible);
    }

    #[test]
    fn spec_reference_lines_at_means() {
        let df = tagged_teams();
        let axes = AxisSelection::new(&df, &teams(), "Goles", "Tiros").unwrap();
        let spec = build_scatter_spec(
            &df,
            &axes,
            COLOR_TAG_COLUMN,
            "Equipo",
            QuadrantMeans { x: 65.0, y: 450.0 },
            &ChartStyle::default(),
        )
        .unwrap();
        assert_eq!(spec.reference_lines.len(), 2);
        let vertical = &spec.reference_lines[0];
        assert_eq!(vertical.orientation, LineOrientation::Vertical);
        assert_eq!(vertical.value, 65.0);
        assert_eq!(vertical.dash, LineDash::Dash);
        assert_eq!(vertical.color, "gray");
        let horizontal = &spec.reference_lines[1];
        assert_eq!(horizontal.orientation, LineOrientation::Horizontal);
        assert_eq!(horizontal.value, 450.0);
    }

    #[test]
    fn spec_requires_tag_column() {
        let df = df!("Equipo" => &["Arsenal"], "x" => &[1.0_f64]).unwrap();
        let axes = AxisSelection::new(&df, &teams(), "x", "x").unwrap();
        let err = build_scatter_spec(
            &df,
            &axes,
            COLOR_TAG_COLUMN,
            "Equipo",
            QuadrantMeans { x: 1.0, y: 1.0 },
            &ChartStyle::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExploreError::MissingColumn { .. }));
    }

    #[test]
    fn spec_serializes_tags_lowercase() {
        let df = tagged_teams();
        let axes = AxisSelection::new(&df, &teams(), "Tiros", "Tiros").unwrap();
        let spec = build_scatter_spec(
            &df,
            &axes,
            COLOR_TAG_COLUMN,
            "Equipo",
            QuadrantMeans { x: 450.0, y: 450.0 },
            &ChartStyle::default(),
        )
        .unwrap();
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["points"][1]["tag"], "highlighted");
        assert_eq!(json["reference_lines"][0]["dash"], "dash");
        assert_eq!(json["title"]["anchor"], "center");
    }

    #[test]
    fn bounds_include_means_and_pad() {
        let df = tagged_teams();
        let axes = AxisSelection::new(&df, &teams(), "Goles", "Tiros").unwrap();
        let spec = build_scatter_spec(
            &df,
            &axes,
            COLOR_TAG_COLUMN,
            "Equipo",
            QuadrantMeans { x: 80.0, y: 450.0 },
            &ChartStyle::default(),
        )
        .unwrap();
        let b = spec.bounds().unwrap();
        assert!(b.x_min < 60.0 && b.x_max > 80.0);
        assert!(b.y_min < 450.0 && b.y_max > 500.0);
    }

    #[test]
    fn format_axis_label_variants() {
        assert_eq!(format_axis_label(1500.0), "1500");
        assert_eq!(format_axis_label(0.35), "0.35");
        assert_eq!(format_axis_label(2_500_000.0), "2.50e6");
    }
}
