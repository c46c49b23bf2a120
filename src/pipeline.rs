//! One exploration run: worksheet bytes and user selections in, chart spec out.
//!
//! Each call re-evaluates every stage from the uploaded bytes; nothing is cached between runs.

use polars::prelude::DataFrame;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::chart_data::{build_scatter_spec, compute_means, ChartSpec, ChartStyle, QuadrantMeans};
use crate::error::{ExploreError, Result};
use crate::filter::{
    distinct_entities, exclude_zeros, filter_by_range, observed_range, resolve_highlight_target,
    tag_rows, ValueRange, COLOR_TAG_COLUMN,
};
use crate::schema::{axis_candidates, detect_mode, AxisSelection, SchemaColumns, SchemaMode};
use crate::sheet::{list_sheets, load_sheet};
use crate::{AppConfig, Args};

/// User selections for one run. `None` takes the default of the corresponding control.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExploreRequest {
    /// Worksheet name (default: first sheet).
    pub sheet: Option<String>,
    pub x_column: Option<String>,
    pub y_column: Option<String>,
    /// Inclusive minutes bounds; player sheets only.
    pub min_minutes: Option<f64>,
    pub max_minutes: Option<f64>,
    pub exclude_zeros: bool,
    pub highlight: Option<String>,
}

impl From<&Args> for ExploreRequest {
    fn from(args: &Args) -> Self {
        Self {
            sheet: args.sheet.clone(),
            x_column: args.x_column.clone(),
            y_column: args.y_column.clone(),
            min_minutes: args.min_minutes,
            max_minutes: args.max_minutes,
            exclude_zeros: args.exclude_zeros,
            highlight: args.highlight.clone(),
        }
    }
}

/// Column names and chart style, normally from the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExploreSettings {
    pub columns: SchemaColumns,
    pub style: ChartStyle,
}

impl ExploreSettings {
    /// Config values, with column names given on the command line taking precedence.
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        let mut columns = config.columns.schema_columns();
        if let Some(player) = &args.player_column {
            columns.player = player.clone();
        }
        if let Some(team) = &args.team_column {
            columns.team = team.clone();
        }
        if let Some(minutes) = &args.minutes_column {
            columns.minutes = minutes.clone();
        }
        Self {
            columns,
            style: config.chart.style(),
        }
    }
}

/// Result of a run: the options a UI would offer plus the chart for the current selection.
#[derive(Debug, Clone, Serialize)]
pub struct Exploration {
    pub sheets: Vec<String>,
    pub sheet: String,
    pub mode: SchemaMode,
    pub axis_candidates: Vec<String>,
    pub axes: AxisSelection,
    /// Observed minutes range of the sheet (player mode).
    pub minutes_bounds: Option<ValueRange>,
    /// Range applied by the filter (player mode).
    pub minutes_range: Option<ValueRange>,
    /// Rows left after filtering.
    pub rows: usize,
    /// Highlight options, in row order, after filtering.
    pub entities: Vec<String>,
    pub target: Option<String>,
    pub means: QuadrantMeans,
    pub chart: ChartSpec,
}

/// Widget options for one sheet, before any filter is applied.
#[derive(Debug, Clone, Serialize)]
pub struct SheetOverview {
    pub sheets: Vec<String>,
    pub sheet: String,
    pub mode: SchemaMode,
    pub axis_candidates: Vec<String>,
    pub minutes_bounds: Option<ValueRange>,
    pub rows: usize,
    pub entities: Vec<String>,
}

impl fmt::Display for SheetOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sheet: {} ({} rows)", self.sheet, self.rows)?;
        writeln!(f, "Sheets: {}", self.sheets.join(", "))?;
        writeln!(f, "{}", self.mode.describe())?;
        writeln!(f, "Axis columns: {}", self.axis_candidates.join(", "))?;
        if let Some(bounds) = self.minutes_bounds {
            writeln!(f, "Minutes played: {} to {}", bounds.min, bounds.max)?;
        }
        write!(
            f,
            "{} options: {}",
            self.mode.entity_label(),
            self.entities.join(", ")
        )
    }
}

struct LoadedSheet {
    sheets: Vec<String>,
    sheet: String,
    df: DataFrame,
    mode: SchemaMode,
}

fn load_selected_sheet(
    content: &[u8],
    request: &ExploreRequest,
    settings: &ExploreSettings,
) -> Result<LoadedSheet> {
    let sheets = list_sheets(content)?;
    let sheet = match (&request.sheet, sheets.first()) {
        (Some(requested), _) => requested.clone(),
        (None, Some(first)) => first.clone(),
        (None, None) => {
            return Err(ExploreError::UnreadableFile(
                "workbook has no worksheets".to_string(),
            ))
        }
    };
    let df = load_sheet(content, &sheet)?;
    let mode = detect_mode(&df, &settings.columns)?;
    info!(sheet = sheet.as_str(), mode = ?mode, rows = df.height(), "worksheet selected");
    Ok(LoadedSheet {
        sheets,
        sheet,
        df,
        mode,
    })
}

/// Options shown for the selected sheet (`--describe`).
pub fn describe(
    content: &[u8],
    request: &ExploreRequest,
    settings: &ExploreSettings,
) -> Result<SheetOverview> {
    let loaded = load_selected_sheet(content, request, settings)?;
    let minutes_bounds = match loaded.mode.minutes_column() {
        Some(minutes) => observed_range(&loaded.df, minutes)?,
        None => None,
    };
    Ok(SheetOverview {
        axis_candidates: axis_candidates(&loaded.df, &loaded.mode),
        entities: distinct_entities(&loaded.df, loaded.mode.identifier_column())?,
        rows: loaded.df.height(),
        minutes_bounds,
        sheets: loaded.sheets,
        sheet: loaded.sheet,
        mode: loaded.mode,
    })
}

/// Run the full pipeline for one set of selections.
pub fn explore(
    content: &[u8],
    request: &ExploreRequest,
    settings: &ExploreSettings,
) -> Result<Exploration> {
    let LoadedSheet {
        sheets,
        sheet,
        df,
        mode,
    } = load_selected_sheet(content, request, settings)?;

    let candidates = axis_candidates(&df, &mode);
    let default_axis = default_axis(&df, &mode, &candidates);
    let pick = |requested: &Option<String>, axis: &str| -> Result<String> {
        requested
            .clone()
            .or_else(|| default_axis.clone())
            .ok_or_else(|| ExploreError::missing_column("<any non-identifier column>", axis))
    };
    let x = pick(&request.x_column, "X axis")?;
    let y = pick(&request.y_column, "Y axis")?;
    let axes = AxisSelection::new(&df, &mode, &x, &y)?;
    debug!(x = axes.x.as_str(), y = axes.y.as_str(), "axes selected");

    let (df, minutes_bounds, minutes_range) = match mode.minutes_column() {
        Some(minutes) => {
            let bounds = observed_range(&df, minutes)?;
            match requested_range(bounds, request.min_minutes, request.max_minutes)? {
                Some(range) => {
                    let filtered = filter_by_range(&df, minutes, range.min, range.max)?;
                    (filtered, bounds, Some(range))
                }
                None => (df, bounds, None),
            }
        }
        None => {
            if request.min_minutes.is_some() || request.max_minutes.is_some() {
                warn!("minutes bounds ignored: team sheets have no minutes column");
            }
            (df, None, None)
        }
    };

    let df = if request.exclude_zeros {
        exclude_zeros(&df, &axes.x, &axes.y)?
    } else {
        df
    };

    let identifier = mode.identifier_column();
    let entities = distinct_entities(&df, identifier)?;
    let target = resolve_highlight_target(&df, identifier, request.highlight.as_deref())?;
    let tagged = tag_rows(&df, identifier, target.as_deref().unwrap_or_default())?;
    let means = compute_means(&tagged, &axes.x, &axes.y)?;
    debug!(
        rows = tagged.height(),
        mean_x = means.x,
        mean_y = means.y,
        "quadrant means computed"
    );
    let chart = build_scatter_spec(
        &tagged,
        &axes,
        COLOR_TAG_COLUMN,
        identifier,
        means,
        &settings.style,
    )?;

    Ok(Exploration {
        sheets,
        sheet,
        axis_candidates: candidates,
        axes,
        minutes_bounds,
        minutes_range,
        rows: tagged.height(),
        entities,
        target,
        means,
        chart,
        mode,
    })
}

/// First axis candidate; when no column is numeric, the first non-identifier column.
fn default_axis(df: &DataFrame, mode: &SchemaMode, candidates: &[String]) -> Option<String> {
    candidates.first().cloned().or_else(|| {
        df.get_column_names()
            .into_iter()
            .find(|c| c.as_str() != mode.identifier_column())
            .map(|c| c.to_string())
    })
}

/// Bounds to filter on: requested values, with observed bounds filling the gaps.
/// `None` when nothing was requested and the column has no numeric value.
fn requested_range(
    observed: Option<ValueRange>,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<Option<ValueRange>> {
    let min = min.or(observed.map(|b| b.min));
    let max = max.or(observed.map(|b| b.max));
    match (min, max) {
        (None, None) => Ok(None),
        (min, max) => ValueRange::new(
            min.unwrap_or(f64::NEG_INFINITY),
            max.unwrap_or(f64::INFINITY),
        )
        .map(Some),
    }
}
