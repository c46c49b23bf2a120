use color_eyre::eyre::eyre;
use color_eyre::Result;
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::chart_data::{
    ChartStyle, DEFAULT_HIGHLIGHT_COLOR, DEFAULT_LEGEND_TITLE, DEFAULT_NORMAL_COLOR,
    DEFAULT_REFERENCE_LINE_COLOR, DEFAULT_REFERENCE_LINE_WIDTH,
};
use crate::schema::{
    SchemaColumns, DEFAULT_MINUTES_COLUMN, DEFAULT_PLAYER_COLUMN, DEFAULT_TEAM_COLUMN,
};

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string with comments.
    /// All fields are commented out so defaults are used, but users can uncomment to override
    pub fn generate_default_config(&self) -> String {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config)
            .unwrap_or_else(|e| panic!("Failed to serialize default config: {}", e));

        Self::comment_all_fields(&toml_str, &Self::collect_all_comments())
    }

    /// Collect all field comments from the per-section constants into a map keyed by dotted path
    fn collect_all_comments() -> HashMap<String, &'static str> {
        let mut comments = HashMap::new();
        let sections: [(&str, &[(&str, &'static str)]); 5] = [
            ("", APP_COMMENTS),
            ("columns", COLUMNS_COMMENTS),
            ("chart", CHART_COMMENTS),
            ("export", EXPORT_COMMENTS),
            ("logging", LOGGING_COMMENTS),
        ];
        for (section, fields) in sections {
            for (field, comment) in fields {
                let key = if section.is_empty() {
                    field.to_string()
                } else {
                    format!("{}.{}", section, field)
                };
                comments.insert(key, *comment);
            }
        }
        comments
    }

    /// Comment out all fields in TOML and add comments
    fn comment_all_fields(toml: &str, comments: &HashMap<String, &'static str>) -> String {
        let mut result = String::new();
        result.push_str("# scoutplot configuration file\n");
        result
            .push_str("# This file uses TOML format. See https://toml.io/ for syntax reference.\n");
        result.push('\n');

        let mut current_section = String::new();
        for line in toml.lines() {
            if let Some(section) = Self::extract_section_name(line) {
                if let Some((_, header)) = SECTION_HEADERS.iter().find(|(s, _)| *s == section) {
                    result.push_str(header);
                    result.push('\n');
                }
                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
                current_section = section;
                continue;
            }

            if let Some(field_path) = Self::extract_field_path(line, &current_section) {
                if let Some(comment) = comments.get(&field_path) {
                    for comment_line in comment.lines() {
                        result.push_str("# ");
                        result.push_str(comment_line);
                        result.push('\n');
                    }
                }
                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
            } else {
                result.push_str(line);
                result.push('\n');
            }
        }
        result
    }

    /// Extract section name from TOML line like "[chart]"
    fn extract_section_name(line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            Some(trimmed[1..trimmed.len() - 1].to_string())
        } else {
            None
        }
    }

    /// Dotted path of a `field = value` line within the current section
    fn extract_field_path(line: &str, current_section: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
            return None;
        }
        let eq_pos = trimmed.find('=')?;
        let field_name = trimmed[..eq_pos].trim();
        if current_section.is_empty() {
            Some(field_name.to_string())
        } else {
            Some(format!("{}.{}", current_section, field_name))
        }
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path(CONFIG_FILE_NAME);

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, self.generate_default_config())?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub columns: ColumnsConfig,
    pub chart: ChartConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

const APP_COMMENTS: &[(&str, &str)] = &[(
    "version",
    "Configuration format version (for future compatibility)",
)];

const SECTION_HEADERS: &[(&str, &str)] = &[
    (
        "columns",
        "# ============================================================================\n# Worksheet Columns\n# ============================================================================\n# Header names that identify player sheets, team sheets and minutes played.",
    ),
    (
        "chart",
        "# ============================================================================\n# Chart Style\n# ============================================================================\n# Colors: hex (#rrggbb) or names (skyblue, gray, red, ...)",
    ),
    (
        "export",
        "# ============================================================================\n# Image Export\n# ============================================================================",
    ),
    (
        "logging",
        "# ============================================================================\n# Logging\n# ============================================================================",
    ),
];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            columns: ColumnsConfig::default(),
            chart: ChartConfig::default(),
            export: ExportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub player: String,
    pub team: String,
    pub minutes: String,
}

const COLUMNS_COMMENTS: &[(&str, &str)] = &[
    (
        "player",
        "Player name column. Sheets with this column are per-player and need the minutes column",
    ),
    ("team", "Team name column. Used when the player column is absent"),
    (
        "minutes",
        "Minutes played column (player sheets only); drives the minutes range filter",
    ),
];

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            player: DEFAULT_PLAYER_COLUMN.to_string(),
            team: DEFAULT_TEAM_COLUMN.to_string(),
            minutes: DEFAULT_MINUTES_COLUMN.to_string(),
        }
    }
}

impl ColumnsConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ColumnsConfig::default();
        if other.player != default.player {
            self.player = other.player;
        }
        if other.team != default.team {
            self.team = other.team;
        }
        if other.minutes != default.minutes {
            self.minutes = other.minutes;
        }
    }

    pub fn schema_columns(&self) -> SchemaColumns {
        SchemaColumns {
            player: self.player.clone(),
            team: self.team.clone(),
            minutes: self.minutes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub highlight_color: String,
    pub normal_color: String,
    pub reference_line_color: String,
    pub reference_line_width: u32,
    pub legend_title: String,
}

const CHART_COMMENTS: &[(&str, &str)] = &[
    ("highlight_color", "Color of the highlighted player or team"),
    ("normal_color", "Color of every other point"),
    (
        "reference_line_color",
        "Color of the dashed quadrant lines drawn at the mean of each axis",
    ),
    ("reference_line_width", "Width of the quadrant lines in pixels (>= 1)"),
    (
        "legend_title",
        "Legend title carried in the chart spec (the legend itself is hidden)",
    ),
];

impl Default for ChartConfig {
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

impl ChartConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ChartConfig::default();
        if other.highlight_color != default.highlight_color {
            self.highlight_color = other.highlight_color;
        }
        if other.normal_color != default.normal_color {
            self.normal_color = other.normal_color;
        }
        if other.reference_line_color != default.reference_line_color {
            self.reference_line_color = other.reference_line_color;
        }
        if other.reference_line_width != default.reference_line_width {
            self.reference_line_width = other.reference_line_width;
        }
        if other.legend_title != default.legend_title {
            self.legend_title = other.legend_title;
        }
    }

    pub fn style(&self) -> ChartStyle {
        ChartStyle {
            highlight_color: self.highlight_color.clone(),
            normal_color: self.normal_color.clone(),
            reference_line_color: self.reference_line_color.clone(),
            reference_line_width: self.reference_line_width,
            legend_title: self.legend_title.clone(),
        }
    }
}

pub const DEFAULT_EXPORT_WIDTH: u32 = 1200;
pub const DEFAULT_EXPORT_HEIGHT: u32 = 800;
/// Largest image side accepted for export.
pub const MAX_EXPORT_SIDE: u32 = 10_000;

/// Image side in pixels, from the config file or the command line.
pub fn check_export_side(name: &str, value: u32) -> Result<u32> {
    if value == 0 || value > MAX_EXPORT_SIDE {
        return Err(eyre!(
            "{} must be between 1 and {}, got {}",
            name,
            MAX_EXPORT_SIDE,
            value
        ));
    }
    Ok(value)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
}

const EXPORT_COMMENTS: &[(&str, &str)] = &[
    ("width", "PNG/SVG width in pixels"),
    ("height", "PNG/SVG height in pixels"),
];

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_EXPORT_WIDTH,
            height: DEFAULT_EXPORT_HEIGHT,
        }
    }
}

impl ExportConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ExportConfig::default();
        if other.width != default.width {
            self.width = other.width;
        }
        if other.height != default.height {
            self.height = other.height;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing filter directive, e.g. "warn" or "scoutplot=debug"
    pub level: String,
}

const LOGGING_COMMENTS: &[(&str, &str)] = &[(
    "level",
    "Log filter for stderr output (error, warn, info, debug, trace or a tracing directive such as \"scoutplot=debug\")\nRUST_LOG overrides this; --debug forces debug",
)];

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.level != LoggingConfig::default().level {
            self.level = other.level;
        }
    }
}

impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let manager = ConfigManager::new(app_name)?;
        Self::load_from(&manager)
    }

    /// Load from a specific config directory (defaults when the file does not exist)
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let config_path = manager.config_path(CONFIG_FILE_NAME);
        let mut config = AppConfig::default();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).map_err(|e| {
                eyre!(
                    "Failed to read config file at {}: {}",
                    config_path.display(),
                    e
                )
            })?;
            let user_config: AppConfig = toml::from_str(&content).map_err(|e| {
                eyre!(
                    "Failed to parse config file at {}: {}",
                    config_path.display(),
                    e
                )
            })?;
            config.merge(user_config);
        }

        config
            .validate()
            .map_err(|e| eyre!("Invalid configuration in {}: {}", config_path.display(), e))?;

        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }
        self.columns.merge(other.columns);
        self.chart.merge(other.chart);
        self.export.merge(other.export);
        self.logging.merge(other.logging);
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.x",
                self.version
            ));
        }

        for (name, value) in [
            ("columns.player", &self.columns.player),
            ("columns.team", &self.columns.team),
            ("columns.minutes", &self.columns.minutes),
        ] {
            if value.trim().is_empty() {
                return Err(eyre!("{} must not be empty", name));
            }
        }

        if self.chart.reference_line_width == 0 {
            return Err(eyre!("chart.reference_line_width must be at least 1"));
        }

        check_export_side("export.width", self.export.width)?;
        check_export_side("export.height", self.export.height)?;

        let parser = ColorParser::new();
        for (name, value) in [
            ("highlight_color", &self.chart.highlight_color),
            ("normal_color", &self.chart.normal_color),
            ("reference_line_color", &self.chart.reference_line_color),
        ] {
            parser.parse(value).map_err(|e| {
                eyre!(
                    "chart.{}: {}. Use a color name (e.g. skyblue, gray) or hex (#rrggbb)",
                    name,
                    e
                )
            })?;
        }

        Ok(())
    }
}

/// Parses color strings (hex or CSS-style names) into plotters colors.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColorParser;

impl ColorParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a color string: "#rrggbb" or a named color (case-insensitive)
    pub fn parse(&self, s: &str) -> Result<RGBColor> {
        let trimmed = s.trim();

        if trimmed.starts_with('#') {
            let (r, g, b) = parse_hex(trimmed)?;
            return Ok(RGBColor(r, g, b));
        }

        let lower = trimmed.to_lowercase().replace(['_', ' '], "");
        let rgb = match lower.as_str() {
            "black" => (0, 0, 0),
            "white" => (255, 255, 255),
            "red" => (255, 0, 0),
            "green" => (0, 128, 0),
            "blue" => (0, 0, 255),
            "yellow" => (255, 255, 0),
            "cyan" => (0, 255, 255),
            "magenta" => (255, 0, 255),
            "orange" => (255, 165, 0),
            "purple" => (128, 0, 128),
            "pink" => (255, 192, 203),
            "brown" => (165, 42, 42),
            "navy" => (0, 0, 128),
            "teal" => (0, 128, 128),
            "skyblue" => (135, 206, 235),
            "lightblue" => (173, 216, 230),
            "gray" | "grey" => (128, 128, 128),
            "lightgray" | "lightgrey" => (211, 211, 211),
            "darkgray" | "darkgrey" => (169, 169, 169),
            _ => {
                return Err(eyre!(
                    "Unknown color name: '{}'. Supported: common CSS names (skyblue, gray, red, ...) \
                     or hex colors (#ff0000)",
                    trimmed
                ))
            }
        };
        Ok(RGBColor(rgb.0, rgb.1, rgb.2))
    }
}

/// Parse a "#rrggbb" string into RGB components
fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(eyre!(
            "Invalid hex color: '{}'. Expected format: #rrggbb",
            s
        ));
    }
    let component = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| eyre!("Invalid hex color: '{}'", s))
    };
    Ok((component(0)?, component(2)?, component(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_and_names() {
        let parser = ColorParser::new();
        assert_eq!(parser.parse("#7a33ff").unwrap(), RGBColor(0x7a, 0x33, 0xff));
        assert_eq!(parser.parse("#7A33FF").unwrap(), RGBColor(0x7a, 0x33, 0xff));
        assert_eq!(parser.parse("SkyBlue").unwrap(), RGBColor(135, 206, 235));
        assert_eq!(parser.parse("light_gray").unwrap(), RGBColor(211, 211, 211));
        assert!(parser.parse("#12345").is_err());
        assert!(parser.parse("#zzzzzz").is_err());
        assert!(parser.parse("chartreuse-ish").is_err());
    }

    #[test]
    fn merge_takes_non_default_values() {
        let mut base = AppConfig::default();
        let mut other = AppConfig::default();
        other.columns.team = "Team".to_string();
        other.export.width = 640;
        base.merge(other);
        assert_eq!(base.columns.team, "Team");
        assert_eq!(base.columns.player, DEFAULT_PLAYER_COLUMN);
        assert_eq!(base.export.width, 640);
        assert_eq!(base.export.height, DEFAULT_EXPORT_HEIGHT);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.chart.normal_color = "not-a-color".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.export.width = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.columns.minutes = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn section_and_field_paths() {
        assert_eq!(
            ConfigManager::extract_section_name("[chart]"),
            Some("chart".to_string())
        );
        assert_eq!(
            ConfigManager::extract_field_path("width = 1200", "export"),
            Some("export.width".to_string())
        );
        assert_eq!(ConfigManager::extract_field_path("# comment", "export"), None);
    }
}
