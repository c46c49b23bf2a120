//! Shared CLI definitions for scoutplot.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Output format for the chart (used to bypass extension-based detection).
/// When `--format` is not specified, format is detected from the `--output` extension.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Declarative chart specification as JSON
    Json,
    /// Rendered PNG image
    Png,
    /// Rendered SVG image
    Svg,
}

impl OutputFormat {
    pub const ALL: [Self; 3] = [Self::Json, Self::Png, Self::Svg];

    /// Detect output format from path extension. Returns None when extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse format from extension string (e.g. "png", "svg").
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(ext))
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    /// True for formats that need a plotters backend (and a file path).
    pub fn is_image(self) -> bool {
        matches!(self, Self::Png | Self::Svg)
    }
}

/// Command-line arguments for scoutplot
#[derive(Clone, Parser, Debug)]
#[command(
    name = "scoutplot",
    version,
    about = "Spreadsheet scatterplot explorer",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path to the spreadsheet file (.xlsx, .xlsm, .xlsb, .xls, .ods).
    /// Not required with --generate-config
    #[arg(required_unless_present = "generate_config", value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Worksheet to explore (default: first sheet)
    #[arg(long = "sheet", value_name = "SHEET")]
    pub sheet: Option<String>,

    /// Print the worksheet names and exit
    #[arg(long = "list-sheets", action)]
    pub list_sheets: bool,

    /// Print schema mode, axis candidates, minutes range and entities for the sheet, then exit
    #[arg(long = "describe", action)]
    pub describe: bool,

    /// Column for the X axis (default: first numeric non-identifier column)
    #[arg(short = 'x', long = "x", value_name = "COLUMN")]
    pub x_column: Option<String>,

    /// Column for the Y axis (default: first numeric non-identifier column)
    #[arg(short = 'y', long = "y", value_name = "COLUMN")]
    pub y_column: Option<String>,

    /// Lower bound (inclusive) of minutes played; player sheets only (default: observed minimum)
    #[arg(long = "min-minutes", value_name = "N")]
    pub min_minutes: Option<f64>,

    /// Upper bound (inclusive) of minutes played; player sheets only (default: observed maximum)
    #[arg(long = "max-minutes", value_name = "N")]
    pub max_minutes: Option<f64>,

    /// Exclude rows where the X or Y value is zero
    #[arg(long = "exclude-zeros", action)]
    pub exclude_zeros: bool,

    /// Player or team to highlight (default: first entity after filtering)
    #[arg(long = "highlight", value_name = "NAME")]
    pub highlight: Option<String>,

    /// Name of the player column (overrides config [columns] player)
    #[arg(long = "player-column", value_name = "COLUMN")]
    pub player_column: Option<String>,

    /// Name of the team column (overrides config [columns] team)
    #[arg(long = "team-column", value_name = "COLUMN")]
    pub team_column: Option<String>,

    /// Name of the minutes-played column (overrides config [columns] minutes)
    #[arg(long = "minutes-column", value_name = "COLUMN")]
    pub minutes_column: Option<String>,

    /// Write the chart to this file instead of stdout. Extension selects the format (.json, .png, .svg)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Force output format (json, png, svg). Images require --output
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Image width in pixels (overrides config [export] width)
    #[arg(long = "width", value_name = "PX")]
    pub width: Option<u32>,

    /// Image height in pixels (overrides config [export] height)
    #[arg(long = "height", value_name = "PX")]
    pub height: Option<u32>,

    /// Enable debug logging on stderr
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Generate default configuration file at ~/.config/scoutplot/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

impl Args {
    /// Output format: explicit --format, else the --output extension, else JSON.
    pub fn output_format(&self) -> OutputFormat {
        self.format
            .or_else(|| self.output.as_deref().and_then(OutputFormat::from_path))
            .unwrap_or(OutputFormat::Json)
    }
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
///
/// Used by the gen_docs binary; output is written to stdout.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let placeholder: String = arg
            .get_value_names()
            .map(|names| {
                names
                    .iter()
                    .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        let option_str = if arg.is_positional() {
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            if !arg.get_action().takes_values() || placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(
            OutputFormat::from_path(Path::new("chart.png")),
            Some(OutputFormat::Png)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("chart.SVG")),
            Some(OutputFormat::Svg)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("spec.json")),
            Some(OutputFormat::Json)
        );
        assert_eq!(OutputFormat::from_path(Path::new("chart.eps")), None);
        assert_eq!(OutputFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_output_format_extension_round_trips() {
        for format in OutputFormat::ALL {
            assert_eq!(OutputFormat::from_extension(format.extension()), Some(format));
        }
        assert!(OutputFormat::Png.is_image());
        assert!(!OutputFormat::Json.is_image());
    }

    #[test]
    fn test_output_format_precedence() {
        let args = Args::parse_from(["scoutplot", "data.xlsx", "-o", "chart.svg"]);
        assert_eq!(args.output_format(), OutputFormat::Svg);

        let args = Args::parse_from(["scoutplot", "data.xlsx", "-o", "chart.svg", "--format", "png"]);
        assert_eq!(args.output_format(), OutputFormat::Png);

        let args = Args::parse_from(["scoutplot", "data.xlsx"]);
        assert_eq!(args.output_format(), OutputFormat::Json);
    }

    #[test]
    fn test_path_optional_with_generate_config() {
        let args = Args::parse_from(["scoutplot", "--generate-config"]);
        assert!(args.path.is_none());
        assert!(Args::try_parse_from(["scoutplot"]).is_err());
    }

    #[test]
    fn test_options_markdown_lists_flags() {
        let md = render_options_markdown();
        assert!(md.contains("--exclude-zeros"));
        assert!(md.contains("--highlight <NAME>"));
        assert!(md.contains("-x, --x <COLUMN>"));
    }
}
