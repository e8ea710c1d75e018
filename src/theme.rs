use crate::ir::NodeKind;
use serde::{Deserialize, Serialize};

/// Visual palette consumed by the layout engine and the renderer.
///
/// The engine only reads accent and edge colors; everything else is passed
/// through to the renderer untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub node_text_color: String,
    pub label_accent: String,
    pub action_accent: String,
    pub conditional_accent: String,
    pub menu_accent: String,
    pub option_accent: String,
    pub terminal_accent: String,
    pub edge_color: String,
    pub true_edge_color: String,
    pub false_edge_color: String,
    pub option_edge_color: String,
    pub terminal_edge_color: String,
}

impl Theme {
    pub fn editor_light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            node_text_color: "#1C2430".to_string(),
            label_accent: "#7C5CDB".to_string(),
            action_accent: "#4A90D9".to_string(),
            conditional_accent: "#E8A33D".to_string(),
            menu_accent: "#3DA886".to_string(),
            option_accent: "#5FBFA2".to_string(),
            terminal_accent: "#9AA5B1".to_string(),
            edge_color: "#7A8AA6".to_string(),
            true_edge_color: "#3DA86B".to_string(),
            false_edge_color: "#D95C5C".to_string(),
            option_edge_color: "#3DA886".to_string(),
            terminal_edge_color: "#B3BCC8".to_string(),
        }
    }

    pub fn editor_dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#1A1D23".to_string(),
            node_text_color: "#E6EAF0".to_string(),
            label_accent: "#9D85E8".to_string(),
            action_accent: "#6BA8E8".to_string(),
            conditional_accent: "#F0B95C".to_string(),
            menu_accent: "#54C4A0".to_string(),
            option_accent: "#7BD4B8".to_string(),
            terminal_accent: "#6B7684".to_string(),
            edge_color: "#566178".to_string(),
            true_edge_color: "#54C483".to_string(),
            false_edge_color: "#E87676".to_string(),
            option_edge_color: "#54C4A0".to_string(),
            terminal_edge_color: "#454E5C".to_string(),
        }
    }

    /// Accent color for a node's visual type.
    pub fn accent_for(&self, kind: NodeKind) -> &str {
        match kind {
            NodeKind::Label => &self.label_accent,
            NodeKind::Conditional => &self.conditional_accent,
            NodeKind::Menu => &self.menu_accent,
            NodeKind::MenuOption => &self.option_accent,
            NodeKind::Terminal => &self.terminal_accent,
            NodeKind::Action | NodeKind::Other => &self.action_accent,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::editor_light()
    }
}
