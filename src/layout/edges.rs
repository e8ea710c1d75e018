use std::collections::HashSet;
use std::ops::Range;

use super::types::{DiagramEdge, EdgeLabel, EdgeStyle, LayoutFrame};
use crate::ir::NodeKind;
use crate::theme::Theme;

/// Edge identity is deterministic: source, target, and a discriminator
/// for edges that could otherwise collide on the same pair.
pub(super) fn edge_id(source: &str, target: &str, discriminator: Option<&str>) -> String {
    match discriminator {
        Some(disc) => format!("edge-{source}-{target}-{disc}"),
        None => format!("edge-{source}-{target}"),
    }
}

/// Plain flow edge between two sequential nodes.
pub(super) fn sequential_edge(theme: &Theme, source: &str, target: &str) -> DiagramEdge {
    DiagramEdge {
        id: edge_id(source, target, None),
        source: source.to_string(),
        target: target.to_string(),
        label: None,
        style: EdgeStyle {
            stroke: theme.edge_color.clone(),
            dashed: false,
        },
    }
}

/// Labeled True/False edge out of a conditional.
pub(super) fn branch_edge(
    theme: &Theme,
    source: &str,
    target: &str,
    label: EdgeLabel,
) -> DiagramEdge {
    let (disc, stroke) = match label {
        EdgeLabel::True => ("true", theme.true_edge_color.clone()),
        EdgeLabel::False => ("false", theme.false_edge_color.clone()),
    };
    DiagramEdge {
        id: edge_id(source, target, Some(disc)),
        source: source.to_string(),
        target: target.to_string(),
        label: Some(label),
        style: EdgeStyle {
            stroke,
            dashed: false,
        },
    }
}

/// Unlabeled edge from a menu to one of its options.
pub(super) fn option_edge(theme: &Theme, source: &str, target: &str) -> DiagramEdge {
    DiagramEdge {
        id: edge_id(source, target, None),
        source: source.to_string(),
        target: target.to_string(),
        label: None,
        style: EdgeStyle {
            stroke: theme.option_edge_color.clone(),
            dashed: false,
        },
    }
}

/// Edge into a block's synthetic terminal node.
pub(super) fn terminal_edge(theme: &Theme, source: &str, target: &str) -> DiagramEdge {
    DiagramEdge {
        id: edge_id(source, target, None),
        source: source.to_string(),
        target: target.to_string(),
        label: None,
        style: EdgeStyle {
            stroke: theme.terminal_edge_color.clone(),
            dashed: true,
        },
    }
}

/// Default parent-to-child edge, emitted only when the predecessor is a
/// plain sequential node. Conditionals and menus own their outgoing
/// edges and must not get a second, unlabeled one.
pub(super) fn link_from_parent(
    frame: &mut LayoutFrame,
    theme: &Theme,
    parent: Option<&ParentLink>,
    target: &str,
) {
    if let Some(parent) = parent
        && !parent.kind.is_branching()
    {
        let edge = sequential_edge(theme, &parent.id, target);
        frame.edges.push(edge);
    }
}

/// The immediately preceding node: enough of it to decide whether a
/// default sequential edge applies.
#[derive(Debug, Clone)]
pub(super) struct ParentLink {
    pub id: String,
    pub kind: NodeKind,
}

/// After a block is fully laid out, every node in it with no outgoing
/// edge (other than the block root and the terminal itself) is wired to
/// the block's terminal.
pub(super) fn connect_dangling_leaves(
    frame: &mut LayoutFrame,
    theme: &Theme,
    block_nodes: Range<usize>,
    block_edges_start: usize,
    block_root_id: &str,
    terminal_id: &str,
) {
    let sources: HashSet<&str> = frame.edges[block_edges_start..]
        .iter()
        .map(|edge| edge.source.as_str())
        .collect();
    let dangling: Vec<String> = frame.nodes[block_nodes]
        .iter()
        .filter(|node| node.id != block_root_id && node.id != terminal_id)
        .filter(|node| !sources.contains(node.id.as_str()))
        .map(|node| node.id.clone())
        .collect();
    for source in dangling {
        let edge = terminal_edge(theme, &source, terminal_id);
        frame.edges.push(edge);
    }
}
