use serde::{Deserialize, Deserializer, Serialize};

/// Node classification produced by the upstream script parser.
///
/// Deserialization accepts the parser's historical block names so trees
/// serialized by older editor backends keep loading. Anything
/// unrecognized becomes `Other` and is laid out as a generic leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Label,
    #[default]
    Action,
    Conditional,
    Menu,
    MenuOption,
    Terminal,
    Other,
}

impl NodeKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Label" | "LabelBlock" => Self::Label,
            "Action" => Self::Action,
            "Conditional" | "IfBlock" | "ElseBlock" => Self::Conditional,
            "Menu" | "MenuBlock" => Self::Menu,
            "MenuOption" => Self::MenuOption,
            "Terminal" => Self::Terminal,
            _ => Self::Other,
        }
    }

    /// Conditional and menu nodes own their outgoing edges; the default
    /// sequential parent-to-child edge is suppressed for them.
    pub fn is_branching(self) -> bool {
        matches!(self, Self::Conditional | Self::Menu)
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// One node of the parsed script tree, as handed over by the editor
/// backend. `children` is the sequential body (true branch for
/// conditionals, options for menus); `false_branch` is only populated on
/// conditionals.
///
/// `id` should be unique across the whole tree for one transform call.
/// A missing id is tolerated and replaced by a deterministic fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "node_type", alias = "type", default)]
    pub kind: NodeKind,
    #[serde(rename = "label_name", alias = "label", default)]
    pub label: String,
    #[serde(default)]
    pub start_line: usize,
    #[serde(default)]
    pub end_line: usize,
    #[serde(default)]
    pub children: Vec<ScriptNode>,
    #[serde(default)]
    pub false_branch: Vec<ScriptNode>,
}

impl ScriptNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: None,
            kind,
            label: String::new(),
            start_line: 0,
            end_line: 0,
            children: Vec::new(),
            false_branch: Vec::new(),
        }
    }

    /// Total node count of this subtree, both branches included.
    pub fn count(&self) -> usize {
        1 + self
            .children
            .iter()
            .chain(self.false_branch.iter())
            .map(ScriptNode::count)
            .sum::<usize>()
    }
}
