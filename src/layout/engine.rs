use std::ops::Range;

use super::edges::{
    ParentLink, branch_edge, link_from_parent, option_edge, sequential_edge,
};
use super::types::{
    DiagramNode, Diagnostic, EdgeLabel, LayoutFrame, NodeOrigin, Position, Size, Span,
};
use crate::config::LayoutConfig;
use crate::display::{DisplayResolver, NodeDisplay, SourceContext};
use crate::ir::{NodeKind, ScriptNode};
use crate::theme::Theme;

/// Invocation-scoped counter for nodes that arrive without an id. The
/// allocation order is a pure function of the tree shape, so repeated
/// runs over the same input produce identical fallback ids.
#[derive(Debug, Default)]
pub(super) struct IdAllocator {
    next: usize,
}

impl IdAllocator {
    fn allocate(&mut self) -> String {
        let id = format!("node-{}", self.next);
        self.next += 1;
        id
    }
}

pub(super) fn resolve_id(node: &ScriptNode, ids: &mut IdAllocator) -> String {
    match node.id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => ids.allocate(),
    }
}

/// Everything one recursive walk needs. `terminal_id` is the current
/// block's synthetic end node, known before layout starts; it is the
/// target of last resort for mandatory branch edges at the tail of a
/// block.
pub(super) struct LayoutCtx<'a> {
    pub frame: &'a mut LayoutFrame,
    pub ids: &'a mut IdAllocator,
    pub resolver: &'a dyn DisplayResolver,
    pub source: Option<&'a SourceContext>,
    pub theme: &'a Theme,
    pub config: &'a LayoutConfig,
    pub terminal_id: &'a str,
}

pub(super) fn resolve_display(
    resolver: &dyn DisplayResolver,
    source: Option<&SourceContext>,
    theme: &Theme,
    node: &ScriptNode,
) -> NodeDisplay {
    let mut display = resolver.resolve(node, source);
    if display.color.is_none() {
        display.color = Some(theme.accent_for(node.kind).to_string());
    }
    display
}

/// Recursive placement. `parent` is the immediately preceding node (for
/// the default sequential edge), `fallthrough` the id control reaches
/// after this subtree completes, `depth` the nesting level used by the
/// recursion bound.
pub(super) fn layout_node(
    ctx: &mut LayoutCtx,
    node: &ScriptNode,
    id: String,
    parent: Option<&ParentLink>,
    x: f32,
    y: f32,
    depth: usize,
    fallthrough: Option<&str>,
) -> Span {
    match node.kind {
        NodeKind::Conditional => layout_conditional(ctx, node, id, parent, x, y, depth, fallthrough),
        NodeKind::Menu => layout_menu(ctx, node, id, parent, x, y, depth, fallthrough),
        _ => layout_default(ctx, node, id, parent, x, y, depth, fallthrough),
    }
}

fn place_node(ctx: &mut LayoutCtx, node: &ScriptNode, id: &str, x: f32, y: f32) {
    let display = resolve_display(ctx.resolver, ctx.source, ctx.theme, node);
    ctx.frame.nodes.push(DiagramNode {
        id: id.to_string(),
        position: Position { x, y },
        size: Size {
            width: ctx.config.node_width,
            height: ctx.config.node_height,
        },
        visual_type: node.kind,
        display,
        origin: NodeOrigin {
            id: id.to_string(),
            kind: node.kind,
            label: node.label.clone(),
            start_line: node.start_line,
            end_line: node.end_line,
        },
    });
}

/// Span of a freshly placed node: one row tall, one column wide.
fn own_span(ctx: &LayoutCtx, x: f32, y: f32) -> Span {
    Span {
        next_y: y + ctx.config.node_height + ctx.config.vertical_spacing,
        min_x: x,
        max_x: x + ctx.config.node_width,
    }
}

/// True when descending to `depth` would exceed the recursion bound; the
/// caller then absorbs the subtree instead of recursing into it.
fn depth_exceeded(ctx: &mut LayoutCtx, depth: usize, node_id: &str) -> bool {
    if depth < ctx.config.max_depth {
        return false;
    }
    ctx.frame.diagnostics.push(Diagnostic::DepthLimit {
        node_id: node_id.to_string(),
        limit: ctx.config.max_depth,
    });
    true
}

fn translate_range(frame: &mut LayoutFrame, range: Range<usize>, dx: f32) {
    for node in &mut frame.nodes[range] {
        node.position.x += dx;
    }
}

/// Actions, labels, menu options, terminals, and anything unrecognized:
/// place the node, chain it to its predecessor, thread an ordered body
/// below it if there is one, otherwise reconnect a dangling leaf to the
/// inherited fallthrough target.
fn layout_default(
    ctx: &mut LayoutCtx,
    node: &ScriptNode,
    id: String,
    parent: Option<&ParentLink>,
    x: f32,
    y: f32,
    depth: usize,
    fallthrough: Option<&str>,
) -> Span {
    place_node(ctx, node, &id, x, y);
    link_from_parent(ctx.frame, ctx.theme, parent, &id);
    let own = own_span(ctx, x, y);

    if node.children.is_empty() || depth_exceeded(ctx, depth + 1, &id) {
        if let Some(target) = fallthrough {
            let edge = sequential_edge(ctx.theme, &id, target);
            ctx.frame.edges.push(edge);
        }
        return own;
    }

    let link = ParentLink {
        id,
        kind: node.kind,
    };
    let (body, _) = layout_sequence(
        ctx,
        &node.children,
        Some(&link),
        x,
        own.next_y,
        depth + 1,
        fallthrough,
    );
    own.merge(body)
}

/// Ordered body threading: children left to right at constant x, each
/// told that the next sibling (or the inherited fallthrough) is where
/// control goes next, each linked to the previous child so the edges
/// read as a straight chain. Returns the sequence bounds and the first
/// child's id for callers that attach their own entry edge.
fn layout_sequence(
    ctx: &mut LayoutCtx,
    children: &[ScriptNode],
    parent: Option<&ParentLink>,
    x: f32,
    y: f32,
    depth: usize,
    fallthrough: Option<&str>,
) -> (Span, Option<String>) {
    let ids: Vec<String> = children
        .iter()
        .map(|child| resolve_id(child, ctx.ids))
        .collect();
    let mut span = Span::point(x, y);
    let mut link = parent.cloned();
    for (index, child) in children.iter().enumerate() {
        let next = ids.get(index + 1).map(String::as_str).or(fallthrough);
        let child_span = layout_node(
            ctx,
            child,
            ids[index].clone(),
            link.as_ref(),
            x,
            span.next_y,
            depth,
            next,
        );
        span = span.merge(child_span);
        link = Some(ParentLink {
            id: ids[index].clone(),
            kind: child.kind,
        });
    }
    (span, ids.into_iter().next())
}

/// Conditionals always emit exactly two labeled edges. A populated arm
/// is laid out at a provisional x, then translated so both arms sit side
/// by side centered under the conditional (or a lone arm directly under
/// it). An absent arm degrades to a direct edge to the fallthrough
/// target, or to the block terminal at the tail of a block.
fn layout_conditional(
    ctx: &mut LayoutCtx,
    node: &ScriptNode,
    id: String,
    parent: Option<&ParentLink>,
    x: f32,
    y: f32,
    depth: usize,
    fallthrough: Option<&str>,
) -> Span {
    place_node(ctx, node, &id, x, y);
    link_from_parent(ctx.frame, ctx.theme, parent, &id);
    let own = own_span(ctx, x, y);
    let center = x + ctx.config.node_width / 2.0;
    let body_y = own.next_y;

    let has_arms = !node.children.is_empty() || !node.false_branch.is_empty();
    let can_descend = has_arms && !depth_exceeded(ctx, depth + 1, &id);
    let link = ParentLink {
        id: id.clone(),
        kind: NodeKind::Conditional,
    };

    let lay_arm = |ctx: &mut LayoutCtx, arm: &[ScriptNode], label: EdgeLabel| {
        if can_descend && !arm.is_empty() {
            let start = ctx.frame.nodes.len();
            let (span, entry) =
                layout_sequence(ctx, arm, Some(&link), x, body_y, depth + 1, fallthrough);
            if let Some(entry) = entry {
                let edge = branch_edge(ctx.theme, &id, &entry, label);
                ctx.frame.edges.push(edge);
            }
            Some((start..ctx.frame.nodes.len(), span))
        } else {
            let target = fallthrough.unwrap_or(ctx.terminal_id);
            let edge = branch_edge(ctx.theme, &id, target, label);
            ctx.frame.edges.push(edge);
            None
        }
    };

    let true_arm = lay_arm(ctx, &node.children, EdgeLabel::True);
    let false_arm = lay_arm(ctx, &node.false_branch, EdgeLabel::False);

    match (true_arm, false_arm) {
        (Some((true_range, true_span)), Some((false_range, false_span))) => {
            let total = true_span.width() + ctx.config.branch_spacing + false_span.width();
            let left = center - total / 2.0;
            let dx_true = left - true_span.min_x;
            let dx_false =
                left + true_span.width() + ctx.config.branch_spacing - false_span.min_x;
            translate_range(ctx.frame, true_range, dx_true);
            translate_range(ctx.frame, false_range, dx_false);
            own.merge(true_span.translated(dx_true))
                .merge(false_span.translated(dx_false))
        }
        (Some((range, span)), None) | (None, Some((range, span))) => {
            let dx = center - span.width() / 2.0 - span.min_x;
            translate_range(ctx.frame, range, dx);
            own.merge(span.translated(dx))
        }
        (None, None) => own,
    }
}

/// Menus fan out: each option is an independent column seeded with the
/// same fallthrough, laid out at a provisional x and then re-positioned
/// so the whole row is centered under the menu node. The menu owns one
/// unlabeled edge per option; the default sequential edge a naive
/// recursive call would add is suppressed by the parent-link kind.
fn layout_menu(
    ctx: &mut LayoutCtx,
    node: &ScriptNode,
    id: String,
    parent: Option<&ParentLink>,
    x: f32,
    y: f32,
    depth: usize,
    fallthrough: Option<&str>,
) -> Span {
    place_node(ctx, node, &id, x, y);
    link_from_parent(ctx.frame, ctx.theme, parent, &id);
    let own = own_span(ctx, x, y);
    let center = x + ctx.config.node_width / 2.0;
    let body_y = own.next_y;

    if node.children.is_empty() || depth_exceeded(ctx, depth + 1, &id) {
        if let Some(target) = fallthrough {
            let edge = sequential_edge(ctx.theme, &id, target);
            ctx.frame.edges.push(edge);
        }
        return own;
    }

    let link = ParentLink {
        id: id.clone(),
        kind: NodeKind::Menu,
    };
    let mut options: Vec<(Range<usize>, Span)> = Vec::with_capacity(node.children.len());
    for option in &node.children {
        let option_id = resolve_id(option, ctx.ids);
        let edge = option_edge(ctx.theme, &id, &option_id);
        ctx.frame.edges.push(edge);
        let start = ctx.frame.nodes.len();
        let span = layout_node(
            ctx,
            option,
            option_id,
            Some(&link),
            x,
            body_y,
            depth + 1,
            fallthrough,
        );
        options.push((start..ctx.frame.nodes.len(), span));
    }

    let total: f32 = options.iter().map(|(_, span)| span.width()).sum::<f32>()
        + ctx.config.option_spacing * (options.len() - 1) as f32;
    let mut cursor = center - total / 2.0;
    let mut result = own;
    for (range, span) in options {
        let dx = cursor - span.min_x;
        translate_range(ctx.frame, range, dx);
        cursor += span.width() + ctx.config.option_spacing;
        result = result.merge(span.translated(dx));
    }
    result
}
