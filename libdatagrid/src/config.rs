use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use ecolor::Color32;
use eyre::{Context, Result, anyhow};
use serde::de;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use crate::export::ExportSettings;
use crate::grid::GridSize;
use crate::grid::layout::LayoutSettings;

pub static PROJECT_DIR: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("org", "datagrid", "datagrid"));

const CONFIG_FILE: &str = "config.toml";
const LOCAL_DIR: &str = ".datagrid";
const DEFAULT_CONFIG: &str = include_str!("../../default_config.toml");

/// Layered configuration: built-in defaults, user config, local `.datagrid`
/// directories and `DATAGRID_*` environment variables, in that order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridConfig {
    pub grid: GridDefaults,
    pub layout: LayoutSettings,
    pub export: ExportSettings,
    pub style: GridStyle,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridDefaults {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub grid_size: GridSize,
    pub row_col_highlight: bool,
    pub double_click_ms: u64,
}

/// Colours for named classes and the built-in highlights.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GridStyle {
    #[serde(default)]
    pub classes: HashMap<String, ClassStyle>,
    #[serde(default)]
    pub highlight: HighlightColors,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ClassStyle {
    #[serde(default, deserialize_with = "deserialize_optional_hex_color")]
    pub background: Option<Color32>,
    #[serde(default, deserialize_with = "deserialize_optional_hex_color")]
    pub foreground: Option<Color32>,
}

impl ClassStyle {
    fn overlay(self, other: Self) -> Self {
        Self {
            background: other.background.or(self.background),
            foreground: other.foreground.or(self.foreground),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HighlightColors {
    /// Hovered cell.
    #[serde(deserialize_with = "deserialize_hex_color")]
    pub cell_background: Color32,
    #[serde(deserialize_with = "deserialize_hex_color")]
    pub cell_foreground: Color32,
    /// Other cells in the hovered row and column.
    #[serde(deserialize_with = "deserialize_hex_color")]
    pub row_col: Color32,
    #[serde(deserialize_with = "deserialize_hex_color")]
    pub double_clicked: Color32,
    #[serde(deserialize_with = "deserialize_hex_color")]
    pub selected: Color32,
    #[serde(deserialize_with = "deserialize_hex_color")]
    pub expanded: Color32,
}

impl Default for HighlightColors {
    fn default() -> Self {
        Self {
            cell_background: Color32::from_rgb(0xfe, 0xf3, 0xc7),
            cell_foreground: Color32::from_rgb(0xef, 0x44, 0x44),
            row_col: Color32::from_rgb(0xfe, 0xf3, 0xc7),
            double_clicked: Color32::from_rgb(0xbf, 0xdb, 0xfe),
            selected: Color32::from_rgb(0xfd, 0xe6, 0x8a),
            expanded: Color32::from_rgb(0xfd, 0xe6, 0x8a),
        }
    }
}

impl GridStyle {
    /// Merges the styles of space separated class names. Later names win,
    /// unknown names are ignored.
    #[must_use]
    pub fn resolve(&self, class_names: &str) -> ClassStyle {
        class_names
            .split_whitespace()
            .filter_map(|name| self.classes.get(name))
            .fold(ClassStyle::default(), |acc, style| acc.overlay(*style))
    }
}

/// Grid-wide settings taken from [`GridConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridSettings {
    /// Page size for hosts that do not pick their own.
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub grid_size: GridSize,
    pub row_col_highlight: bool,
    pub double_click_window: Duration,
    pub layout: LayoutSettings,
    pub style: GridStyle,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            page_size_options: vec![10, 50, 100],
            grid_size: GridSize::Md,
            row_col_highlight: false,
            double_click_window: Duration::from_millis(250),
            layout: LayoutSettings::default(),
            style: GridStyle::default(),
        }
    }
}

impl From<&GridConfig> for GridSettings {
    fn from(config: &GridConfig) -> Self {
        Self {
            page_size: config.grid.page_size,
            page_size_options: config.grid.page_size_options.clone(),
            grid_size: config.grid.grid_size,
            row_col_highlight: config.grid.row_col_highlight,
            double_click_window: Duration::from_millis(config.grid.double_click_ms),
            layout: config.layout.clone(),
            style: config.style.clone(),
        }
    }
}

impl GridSettings {
    /// Page size choices with `current` merged in, ascending.
    #[must_use]
    pub fn page_size_choices(&self, current: usize) -> Vec<usize> {
        let mut choices = self.page_size_options.clone();
        if !choices.contains(&current) {
            choices.push(current);
        }
        choices.retain(|size| *size > 0);
        choices.sort_unstable();
        choices.dedup();
        choices
    }
}

impl GridConfig {
    pub fn new(force_default_config: bool) -> Result<Self> {
        let mut config = Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if !force_default_config {
            if let Some(proj_dirs) = &*PROJECT_DIR {
                let config_file = proj_dirs.config_dir().join(CONFIG_FILE);
                config = config.add_source(File::from(config_file).required(false));
            }

            // Most top-level directory first, so nested directories override.
            config = find_local_configs()
                .into_iter()
                .fold(config, |c, dir| {
                    c.add_source(File::from(dir.join(CONFIG_FILE)).required(false))
                })
                .add_source(
                    Environment::with_prefix("datagrid")
                        .prefix_separator("_")
                        .separator("__")
                        .try_parsing(true),
                );
        }

        config
            .build()?
            .try_deserialize()
            .map_err(|e| anyhow!("Failed to parse config {e}"))
    }

    /// Built-in defaults overlaid with a TOML string.
    pub fn new_from_toml(overrides: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(overrides, FileFormat::Toml))
            .build()?
            .try_deserialize()
            .map_err(|e| anyhow!("Failed to parse config {e}"))
    }

    #[must_use]
    pub fn settings(&self) -> GridSettings {
        GridSettings::from(self)
    }
}

/// Parses `rgb` or `rrggbb`, with or without a leading `#`.
pub fn hex_string_to_color32(hex: &str) -> Result<Color32> {
    let digits = hex.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(anyhow!("'{hex}' is not a valid RGB hex color")),
    };
    let channel = |range: std::ops::Range<usize>| {
        expanded
            .get(range)
            .ok_or_else(|| anyhow!("'{hex}' is not a valid RGB hex color"))
            .and_then(|pair| {
                u8::from_str_radix(pair, 16)
                    .with_context(|| format!("'{hex}' is not a valid RGB hex color"))
            })
    };
    Ok(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn deserialize_hex_color<'de, D>(deserializer: D) -> Result<Color32, D::Error>
where
    D: Deserializer<'de>,
{
    let buf = String::deserialize(deserializer)?;
    hex_string_to_color32(&buf).map_err(de::Error::custom)
}

fn deserialize_optional_hex_color<'de, D>(deserializer: D) -> Result<Option<Color32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|buf| hex_string_to_color32(&buf).map_err(de::Error::custom))
        .transpose()
}

/// `.datagrid` directories from the filesystem root down to the current
/// directory. Empty when the current directory is unavailable.
fn find_local_configs() -> Vec<PathBuf> {
    let Ok(current) = std::env::current_dir() else {
        return vec![];
    };
    let mut dirs: Vec<PathBuf> = current
        .ancestors()
        .map(|dir| dir.join(LOCAL_DIR))
        .filter(|dir| dir.is_dir())
        .collect();
    dirs.reverse();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = GridConfig::new(true).unwrap();
        assert_eq!(config.grid.page_size, 10);
        assert_eq!(config.grid.page_size_options, vec![10, 50, 100]);
        assert_eq!(config.grid.grid_size, GridSize::Md);
        assert_eq!(config.grid.double_click_ms, 250);
        assert_eq!(config.export.pdf_font_size, 9.0);
        assert!(config.export.directory.is_none());
    }

    #[test]
    fn built_in_settings_match_default_config() {
        let from_file = GridConfig::new(true).unwrap().settings();
        let built_in = GridSettings::default();
        assert_eq!(from_file.page_size, built_in.page_size);
        assert_eq!(from_file.page_size_options, built_in.page_size_options);
        assert_eq!(from_file.grid_size, built_in.grid_size);
        assert_eq!(from_file.row_col_highlight, built_in.row_col_highlight);
        assert_eq!(from_file.double_click_window, built_in.double_click_window);
        assert_eq!(from_file.layout, built_in.layout);
        assert_eq!(from_file.style.highlight, built_in.style.highlight);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = GridConfig::new_from_toml(
            r#"
            [grid]
            page_size = 25
            grid_size = "xs"

            [layout]
            min_column_width = 80.0
            "#,
        )
        .unwrap();
        assert_eq!(config.grid.page_size, 25);
        assert_eq!(config.settings().page_size, 25);
        assert_eq!(config.grid.grid_size, GridSize::Xs);
        assert_eq!(config.layout.min_column_width, 80.0);
        assert_eq!(config.layout.default_column_width, 150.0);
    }

    #[test]
    fn bad_color_is_rejected() {
        let result = GridConfig::new_from_toml(
            r#"
            [style.highlight]
            selected = "zzzzzz"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn hex_colors() {
        assert_eq!(
            hex_string_to_color32("fde68a").unwrap(),
            Color32::from_rgb(0xfd, 0xe6, 0x8a)
        );
        assert_eq!(
            hex_string_to_color32("#abc").unwrap(),
            Color32::from_rgb(0xaa, 0xbb, 0xcc)
        );
        assert!(hex_string_to_color32("abcd").is_err());
        assert!(hex_string_to_color32("gg0000").is_err());
    }

    #[test]
    fn class_names_resolve_in_order() {
        let config = GridConfig::new(true).unwrap();
        let style = &config.style;

        let active = style.resolve("status-active");
        assert_eq!(active.background, Some(Color32::from_rgb(0xbb, 0xf7, 0xd0)));

        let merged = style.resolve("status-active muted unknown");
        assert_eq!(merged.background, Some(Color32::from_rgb(0xbb, 0xf7, 0xd0)));
        assert_eq!(merged.foreground, Some(Color32::from_rgb(0x9c, 0xa3, 0xaf)));

        assert_eq!(style.resolve(""), ClassStyle::default());
    }

    #[test]
    fn page_size_choices_include_current() {
        let settings = GridSettings::default();
        assert_eq!(settings.page_size_choices(10), vec![10, 50, 100]);
        assert_eq!(settings.page_size_choices(25), vec![10, 25, 50, 100]);
    }
}
