//! Spreadsheet scatterplot explorer.
//!
//! Loads one worksheet of a player or team statistics workbook, filters it, highlights one
//! entity and describes a scatter chart with dashed lines at the mean of each axis.

pub mod chart_data;
pub mod chart_export;
pub mod config;
pub mod error;
pub mod error_display;
pub mod filter;
pub mod pipeline;
pub mod schema;
pub mod sheet;

pub use chart_data::{ChartSpec, ChartStyle, QuadrantMeans};
pub use config::{AppConfig, ColorParser, ConfigManager};
pub use error::{ExploreError, Result};
pub use filter::{RowTag, ValueRange};
pub use pipeline::{describe, explore, ExploreRequest, ExploreSettings, Exploration, SheetOverview};
pub use schema::{AxisSelection, SchemaColumns, SchemaMode};
pub use scoutplot_cli::{Args, OutputFormat};

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "scoutplot";

/// Image size in pixels: command-line values over config values.
pub fn export_size(args: &Args, config: &AppConfig) -> color_eyre::Result<(u32, u32)> {
    Ok((
        config::check_export_side("--width", args.width.unwrap_or(config.export.width))?,
        config::check_export_side("--height", args.height.unwrap_or(config.export.height))?,
    ))
}
