//! Filter & highlight: minutes range, zero exclusion, highlight target, per-row color tag.
//!
//! Every operation takes a `DataFrame` by reference and returns a new one; an empty result is
//! a valid zero-row frame, never an error.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{ExploreError, Result};
use crate::schema::has_column;

/// Name of the derived column holding each row's `RowTag`.
pub const COLOR_TAG_COLUMN: &str = "color_tag";

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(ExploreError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }
}

/// Highlight state of one row. Mapped to a color only when a chart is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowTag {
    Highlighted,
    Normal,
}

impl RowTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Highlighted => "highlighted",
            Self::Normal => "normal",
        }
    }
}

impl fmt::Display for RowTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowTag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "highlighted" => Ok(Self::Highlighted),
            "normal" => Ok(Self::Normal),
            other => Err(format!("unknown row tag '{}'", other)),
        }
    }
}

fn require_column(df: &DataFrame, column: &str, context: &str) -> Result<()> {
    if has_column(df, column) {
        Ok(())
    } else {
        Err(ExploreError::missing_column(column, context))
    }
}

/// Numeric view of a column (integers and floats cast to f64; other values become null).
pub(crate) fn numeric_values(df: &DataFrame, column: &str) -> Result<Float64Chunked> {
    let casted = df.column(column)?.cast(&DataType::Float64)?;
    Ok(casted.f64()?.clone())
}

/// Full observed range of a column; `None` when it has no numeric value.
pub fn observed_range(df: &DataFrame, column: &str) -> Result<Option<ValueRange>> {
    require_column(df, column, "range bounds")?;
    let values = numeric_values(df, column)?;
    Ok(match (values.min(), values.max()) {
        (Some(min), Some(max)) => Some(ValueRange { min, max }),
        _ => None,
    })
}

/// Keep rows with `min_inclusive <= row[column] <= max_inclusive`. Rows with no value are dropped.
pub fn filter_by_range(
    df: &DataFrame,
    column: &str,
    min_inclusive: f64,
    max_inclusive: f64,
) -> Result<DataFrame> {
    let range = ValueRange::new(min_inclusive, max_inclusive)?;
    require_column(df, column, "range filter")?;
    let value = col(column).cast(DataType::Float64);
    let out = df
        .clone()
        .lazy()
        .filter(
            value
                .clone()
                .gt_eq(lit(range.min))
                .and(value.lt_eq(lit(range.max))),
        )
        .collect()?;
    debug!(
        column,
        min = range.min,
        max = range.max,
        before = df.height(),
        after = out.height(),
        "range filter applied"
    );
    Ok(out)
}

/// Keep rows where neither `x_column` nor `y_column` is zero. Missing values are not zero.
pub fn exclude_zeros(df: &DataFrame, x_column: &str, y_column: &str) -> Result<DataFrame> {
    require_column(df, x_column, "zero exclusion")?;
    require_column(df, y_column, "zero exclusion")?;
    let non_zero = |name: &str| {
        col(name)
            .cast(DataType::Float64)
            .neq(lit(0.0))
            .fill_null(lit(true))
    };
    let out = df
        .clone()
        .lazy()
        .filter(non_zero(x_column).and(non_zero(y_column)))
        .collect()?;
    debug!(
        x_column,
        y_column,
        before = df.height(),
        after = out.height(),
        "zero exclusion applied"
    );
    Ok(out)
}

/// Distinct non-null identifier values in first-seen row order.
pub fn distinct_entities(df: &DataFrame, identifier: &str) -> Result<Vec<String>> {
    require_column(df, identifier, "identifier")?;
    let names = df.column(identifier)?.cast(&DataType::String)?;
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for name in names.str()?.into_iter().flatten() {
        if seen.insert(name) {
            out.push(name.to_string());
        }
    }
    Ok(out)
}

/// The requested target when it is still in the dataset, else the first entity in row order.
/// `None` only when the dataset has no entity at all.
pub fn resolve_highlight_target(
    df: &DataFrame,
    identifier: &str,
    requested: Option<&str>,
) -> Result<Option<String>> {
    let entities = distinct_entities(df, identifier)?;
    if let Some(wanted) = requested {
        if entities.iter().any(|e| e == wanted) {
            return Ok(Some(wanted.to_string()));
        }
        if let Some(first) = entities.first() {
            tracing::warn!(
                requested = wanted,
                fallback = first.as_str(),
                "highlight target not in filtered rows, using first entity"
            );
        }
    }
    Ok(entities.into_iter().next())
}

/// Add `COLOR_TAG_COLUMN`: `highlighted` where `row[identifier] == target`, else `normal`.
/// A worksheet that already has a column of that name is rejected rather than overwritten.
pub fn tag_rows(df: &DataFrame, identifier: &str, target: &str) -> Result<DataFrame> {
    require_column(df, identifier, "identifier")?;
    if has_column(df, COLOR_TAG_COLUMN) {
        return Err(ExploreError::UnusableColumn {
            column: COLOR_TAG_COLUMN.to_string(),
            reason: "the name is reserved for the highlight tag; rename it in the sheet".to_string(),
        });
    }
    let tag = when(col(identifier).cast(DataType::String).eq(lit(target)))
        .then(lit(RowTag::Highlighted.as_str()))
        .otherwise(lit(RowTag::Normal.as_str()))
        .alias(COLOR_TAG_COLUMN);
    Ok(df.clone().lazy().with_column(tag).collect()?)
}

/// Read back the tags written by `tag_rows` (unknown or missing values read as `Normal`).
pub fn row_tags(df: &DataFrame, tag_column: &str) -> Result<Vec<RowTag>> {
    require_column(df, tag_column, "color tag")?;
    let column = df.column(tag_column)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|t| t.and_then(|s| s.parse().ok()).unwrap_or(RowTag::Normal))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> DataFrame {
        df!(
            "Jugador" => &["A", "B", "C"],
            "Minutos jugados" => &[1000_i64, 500, 1500],
            "Goles" => &[5_i64, 0, 3],
            "Asistencias" => &[2_i64, 1, 0]
        )
        .unwrap()
    }

    fn names(df: &DataFrame) -> Vec<String> {
        distinct_entities(df, "Jugador").unwrap()
    }

    #[test]
    fn range_filter_is_inclusive() {
        let out = filter_by_range(&players(), "Minutos jugados", 500.0, 1000.0).unwrap();
        assert_eq!(names(&out), vec!["A", "B"]);
        let minutes = numeric_values(&out, "Minutos jugados").unwrap();
        assert!((&minutes)
            .into_iter()
            .flatten()
            .all(|m| (500.0..=1000.0).contains(&m)));
    }

    #[test]
    fn observed_range_is_no_op() {
        let df = players();
        let range = observed_range(&df, "Minutos jugados").unwrap().unwrap();
        assert_eq!(range, ValueRange { min: 500.0, max: 1500.0 });
        let out = filter_by_range(&df, "Minutos jugados", range.min, range.max).unwrap();
        assert!(out.equals(&df));
    }

    #[test]
    fn inverted_range_is_invalid() {
        let err = filter_by_range(&players(), "Minutos jugados", 1600.0, 600.0).unwrap_err();
        assert!(matches!(
            err,
            ExploreError::InvalidRange { min, max } if min == 1600.0 && max == 600.0
        ));
    }

    #[test]
    fn range_filter_can_empty_the_dataset() {
        let out = filter_by_range(&players(), "Minutos jugados", 0.0, 10.0).unwrap();
        assert_eq!(out.height(), 0);
        assert_eq!(out.width(), 4);
    }

    #[test]
    fn range_filter_missing_column() {
        let err = filter_by_range(&players(), "Minutes", 0.0, 10.0).unwrap_err();
        assert!(matches!(err, ExploreError::MissingColumn { .. }));
    }

    #[test]
    fn observed_range_of_all_null_column() {
        let df = df!("Jugador" => &["A"], "m" => &[None::<f64>]).unwrap();
        assert_eq!(observed_range(&df, "m").unwrap(), None);
    }

    #[test]
    fn exclude_zeros_drops_either_axis_zero() {
        let out = exclude_zeros(&players(), "Goles", "Asistencias").unwrap();
        assert_eq!(names(&out), vec!["A"]);
    }

    #[test]
    fn exclude_zeros_is_idempotent() {
        let once = exclude_zeros(&players(), "Goles", "Asistencias").unwrap();
        let twice = exclude_zeros(&once, "Goles", "Asistencias").unwrap();
        assert!(once.equals(&twice));
    }

    #[test]
    fn exclude_zeros_keeps_missing_values() {
        let df = df!(
            "Equipo" => &["Arsenal", "Chelsea", "Spurs"],
            "x" => &[Some(1.0_f64), None, Some(0.0)],
            "y" => &[2.0_f64, 3.0, 4.0]
        )
        .unwrap();
        let out = exclude_zeros(&df, "x", "y").unwrap();
        assert_eq!(
            distinct_entities(&out, "Equipo").unwrap(),
            vec!["Arsenal", "Chelsea"]
        );
    }

    #[test]
    fn distinct_entities_first_seen_order() {
        let df = df!("Equipo" => &[Some("B"), Some("A"), None, Some("B")]).unwrap();
        assert_eq!(distinct_entities(&df, "Equipo").unwrap(), vec!["B", "A"]);
    }

    #[test]
    fn resolve_keeps_present_target() {
        let target = resolve_highlight_target(&players(), "Jugador", Some("C")).unwrap();
        assert_eq!(target.as_deref(), Some("C"));
    }

    #[test]
    fn resolve_falls_back_when_filtered_out() {
        let filtered = filter_by_range(&players(), "Minutos jugados", 600.0, 1600.0).unwrap();
        let target = resolve_highlight_target(&filtered, "Jugador", Some("B")).unwrap();
        assert_eq!(target.as_deref(), Some("A"));
        assert!(names(&filtered).contains(&target.unwrap()));
    }

    #[test]
    fn resolve_defaults_to_first_entity() {
        let target = resolve_highlight_target(&players(), "Jugador", None).unwrap();
        assert_eq!(target.as_deref(), Some("A"));
    }

    #[test]
    fn resolve_on_empty_dataset() {
        let empty = players().head(Some(0));
        assert_eq!(resolve_highlight_target(&empty, "Jugador", Some("A")).unwrap(), None);
    }

    #[test]
    fn tag_rows_marks_target_only() {
        let df = df!("Team" => &["Arsenal", "Chelsea"]).unwrap();
        let tagged = tag_rows(&df, "Team", "Arsenal").unwrap();
        assert_eq!(tagged.height(), 2);
        assert_eq!(
            row_tags(&tagged, COLOR_TAG_COLUMN).unwrap(),
            vec![RowTag::Highlighted, RowTag::Normal]
        );
    }

    #[test]
    fn tag_rows_on_numeric_identifier() {
        let df = df!("Equipo" => &[7_i64, 9]).unwrap();
        let tagged = tag_rows(&df, "Equipo", "9").unwrap();
        assert_eq!(
            row_tags(&tagged, COLOR_TAG_COLUMN).unwrap(),
            vec![RowTag::Normal, RowTag::Highlighted]
        );
    }

    #[test]
    fn tag_rows_rejects_existing_tag_column() {
        let df = df!("Team" => &["Arsenal"], COLOR_TAG_COLUMN => &["red"]).unwrap();
        match tag_rows(&df, "Team", "Arsenal") {
            Err(ExploreError::UnusableColumn { column, .. }) => {
                assert_eq!(column, COLOR_TAG_COLUMN)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn row_tag_parses_its_own_names() {
        assert_eq!("highlighted".parse::<RowTag>(), Ok(RowTag::Highlighted));
        assert_eq!(RowTag::Normal.to_string(), "normal");
        assert!("purple".parse::<RowTag>().is_err());
    }
}
