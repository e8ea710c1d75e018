use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry constants for the layout pass. Node size is fixed here rather
/// than derived from measured text so coordinates stay identical across
/// environments for the same input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    /// Gap between a node and the next row below it.
    pub vertical_spacing: f32,
    /// Gap between the true and false columns of a conditional.
    pub branch_spacing: f32,
    /// Gap between adjacent menu option columns.
    pub option_spacing: f32,
    /// Gap between one top-level block's terminal and the next block.
    pub block_spacing: f32,
    /// Recursion bound; subtrees past it are skipped with a diagnostic.
    pub max_depth: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 220.0,
            node_height: 110.0,
            vertical_spacing: 60.0,
            branch_spacing: 80.0,
            option_spacing: 60.0,
            block_spacing: 140.0,
            max_depth: 128,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
}

/// Partial on-disk config; missing fields keep their defaults.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    theme: Option<String>,
    colors: Option<ThemeOverlay>,
    layout: Option<LayoutOverlay>,
}

#[derive(Debug, Default, Deserialize)]
struct ThemeOverlay {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    node_text_color: Option<String>,
    label_accent: Option<String>,
    action_accent: Option<String>,
    conditional_accent: Option<String>,
    menu_accent: Option<String>,
    option_accent: Option<String>,
    terminal_accent: Option<String>,
    edge_color: Option<String>,
    true_edge_color: Option<String>,
    false_edge_color: Option<String>,
    option_edge_color: Option<String>,
    terminal_edge_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LayoutOverlay {
    node_width: Option<f32>,
    node_height: Option<f32>,
    vertical_spacing: Option<f32>,
    branch_spacing: Option<f32>,
    option_spacing: Option<f32>,
    block_spacing: Option<f32>,
    max_depth: Option<usize>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Config files are parsed leniently (JSON5) so hand-edited files with
/// comments and trailing commas keep working.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(name) = parsed.theme.as_deref() {
        if name == "dark" {
            config.theme = Theme::editor_dark();
        } else if name == "light" || name == "default" {
            config.theme = Theme::editor_light();
        }
    }

    if let Some(colors) = parsed.colors {
        let theme = &mut config.theme;
        if let Some(v) = colors.font_family {
            theme.font_family = v;
        }
        if let Some(v) = colors.font_size {
            theme.font_size = v;
        }
        if let Some(v) = colors.background {
            theme.background = v;
        }
        if let Some(v) = colors.node_text_color {
            theme.node_text_color = v;
        }
        if let Some(v) = colors.label_accent {
            theme.label_accent = v;
        }
        if let Some(v) = colors.action_accent {
            theme.action_accent = v;
        }
        if let Some(v) = colors.conditional_accent {
            theme.conditional_accent = v;
        }
        if let Some(v) = colors.menu_accent {
            theme.menu_accent = v;
        }
        if let Some(v) = colors.option_accent {
            theme.option_accent = v;
        }
        if let Some(v) = colors.terminal_accent {
            theme.terminal_accent = v;
        }
        if let Some(v) = colors.edge_color {
            theme.edge_color = v;
        }
        if let Some(v) = colors.true_edge_color {
            theme.true_edge_color = v;
        }
        if let Some(v) = colors.false_edge_color {
            theme.false_edge_color = v;
        }
        if let Some(v) = colors.option_edge_color {
            theme.option_edge_color = v;
        }
        if let Some(v) = colors.terminal_edge_color {
            theme.terminal_edge_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.node_width {
            target.node_width = v;
        }
        if let Some(v) = layout.node_height {
            target.node_height = v;
        }
        if let Some(v) = layout.vertical_spacing {
            target.vertical_spacing = v;
        }
        if let Some(v) = layout.branch_spacing {
            target.branch_spacing = v;
        }
        if let Some(v) = layout.option_spacing {
            target.option_spacing = v;
        }
        if let Some(v) = layout.block_spacing {
            target.block_spacing = v;
        }
        if let Some(v) = layout.max_depth {
            target.max_depth = v;
        }
    }

    Ok(config)
}
