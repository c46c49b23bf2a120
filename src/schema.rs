//! Schema detection: which identifier the worksheet rows carry, and which columns can be axes.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ExploreError, Result};

pub const DEFAULT_PLAYER_COLUMN: &str = "Jugador";
pub const DEFAULT_TEAM_COLUMN: &str = "Equipo";
pub const DEFAULT_MINUTES_COLUMN: &str = "Minutos jugados";

/// Names of the semantic columns the detector looks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumns {
    pub player: String,
    pub team: String,
    pub minutes: String,
}

impl Default for SchemaColumns {
    fn default() -> Self {
        Self {
            player: DEFAULT_PLAYER_COLUMN.to_string(),
            team: DEFAULT_TEAM_COLUMN.to_string(),
            minutes: DEFAULT_MINUTES_COLUMN.to_string(),
        }
    }
}

/// Row identity of a worksheet. Carries only the columns guaranteed present for the mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SchemaMode {
    /// Per-player rows with a minutes-played column.
    Player { identifier: String, minutes: String },
    /// Per-team rows; no minutes filter.
    Team { identifier: String },
}

impl SchemaMode {
    pub fn identifier_column(&self) -> &str {
        match self {
            Self::Player { identifier, .. } | Self::Team { identifier } => identifier,
        }
    }

    /// Minutes column, present only in player mode.
    pub fn minutes_column(&self) -> Option<&str> {
        match self {
            Self::Player { minutes, .. } => Some(minutes),
            Self::Team { .. } => None,
        }
    }

    /// Label for the highlight selector.
    pub fn entity_label(&self) -> &'static str {
        match self {
            Self::Player { .. } => "Player",
            Self::Team { .. } => "Team",
        }
    }

    /// One-line description of the columns in use.
    pub fn describe(&self) -> String {
        match self {
            Self::Player {
                identifier,
                minutes,
            } => format!("Using '{}' and '{}'", identifier, minutes),
            Self::Team { identifier } => format!("Using '{}'", identifier),
        }
    }
}

pub(crate) fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Decide the schema mode from column presence. Player mode wins when both identifiers exist.
pub fn detect_mode(df: &DataFrame, names: &SchemaColumns) -> Result<SchemaMode> {
    if has_column(df, &names.player) {
        if !has_column(df, &names.minutes) {
            return Err(ExploreError::missing_column(
                &names.minutes,
                format!("required with player column '{}'", names.player),
            ));
        }
        return Ok(SchemaMode::Player {
            identifier: names.player.clone(),
            minutes: names.minutes.clone(),
        });
    }
    if has_column(df, &names.team) {
        return Ok(SchemaMode::Team {
            identifier: names.team.clone(),
        });
    }
    Err(ExploreError::UnsupportedSchema {
        player: names.player.clone(),
        team: names.team.clone(),
    })
}

/// Columns offered for the X and Y selectors: numeric, not the identifier, in dataset order.
pub fn axis_candidates(df: &DataFrame, mode: &SchemaMode) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.name().as_str() != mode.identifier_column())
        .filter(|c| c.dtype().is_numeric())
        .map(|c| c.name().to_string())
        .collect()
}

/// The pair of columns plotted on X and Y. Both are present in the dataset and neither is
/// the identifier column; they may be equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisSelection {
    pub x: String,
    pub y: String,
}

impl AxisSelection {
    pub fn new(df: &DataFrame, mode: &SchemaMode, x: &str, y: &str) -> Result<Self> {
        for (axis, column) in [("X axis", x), ("Y axis", y)] {
            if !has_column(df, column) {
                return Err(ExploreError::missing_column(column, axis));
            }
            if column == mode.identifier_column() {
                return Err(ExploreError::UnusableColumn {
                    column: column.to_string(),
                    reason: format!(
                        "the {} identifier cannot be the {}",
                        mode.entity_label().to_lowercase(),
                        axis
                    ),
                });
            }
        }
        Ok(Self {
            x: x.to_string(),
            y: y.to_string(),
        })
    }
}
