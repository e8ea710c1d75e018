use crate::display::NodeDisplay;
use crate::ir::NodeKind;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Copy of the originating script data, kept on each diagram node so the
/// editor can map a selected card back to its source without a lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeOrigin {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramNode {
    pub id: String,
    pub position: Position,
    pub size: Size,
    pub visual_type: NodeKind,
    pub display: NodeDisplay,
    pub origin: NodeOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeLabel {
    True,
    False,
}

/// Stroke styling only; the renderer decides everything else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeStyle {
    pub stroke: String,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<EdgeLabel>,
    pub style: EdgeStyle,
}

/// Recoverable anomalies absorbed during layout. The transform always
/// returns a diagram; these tell the caller what was degraded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("script root has no blocks; produced an empty diagram")]
    EmptyRoot,
    #[error("recursion depth limit {limit} reached at node {node_id}; subtree skipped")]
    DepthLimit { node_id: String, limit: usize },
}

impl Serialize for Diagnostic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The transform result: a renderer-ready node/edge model. Every edge
/// endpoint refers to an id present in `nodes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagram {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Single output sink threaded by `&mut` through the whole recursion.
/// Each recursive call appends nodes/edges and reports back only the
/// bounds it produced, so re-centering a finished branch is a translate
/// over an index range instead of a rebuild.
#[derive(Debug, Default)]
pub(crate) struct LayoutFrame {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Bounds one recursive call consumed: the next free row below the
/// subtree and the horizontal extent it occupies. Sibling branches use
/// this to avoid overlapping.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Span {
    pub next_y: f32,
    pub min_x: f32,
    pub max_x: f32,
}

impl Span {
    /// Zero-width span at a point; the seed for empty subtrees.
    pub fn point(x: f32, y: f32) -> Self {
        Self {
            next_y: y,
            min_x: x,
            max_x: x,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            next_y: self.next_y.max(other.next_y),
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
        }
    }

    pub fn translated(self, dx: f32) -> Span {
        Span {
            next_y: self.next_y,
            min_x: self.min_x + dx,
            max_x: self.max_x + dx,
        }
    }
}
