mod edges;
mod engine;
pub(crate) mod types;
pub use types::*;

use std::collections::HashSet;

use edges::connect_dangling_leaves;
use engine::{IdAllocator, LayoutCtx, layout_node, resolve_display, resolve_id};

use crate::config::LayoutConfig;
use crate::display::{DisplayResolver, SourceContext};
use crate::ir::{NodeKind, ScriptNode};
use crate::theme::Theme;

/// Transform a parsed script tree into a positioned diagram.
///
/// Pure and synchronous: the result is a deterministic function of the
/// tree, the geometry constants, and the resolver output. Recoverable
/// anomalies (empty root, missing ids, runaway nesting) degrade into
/// diagnostics on the returned diagram instead of errors.
pub fn compute_diagram(
    root: &ScriptNode,
    resolver: &dyn DisplayResolver,
    source: Option<&SourceContext>,
    theme: &Theme,
    config: &LayoutConfig,
) -> Diagram {
    let mut frame = LayoutFrame::default();
    if root.children.is_empty() {
        frame.diagnostics.push(Diagnostic::EmptyRoot);
        return assemble(frame, &HashSet::new());
    }

    let mut ids = IdAllocator::default();
    let block_ids: Vec<String> = root
        .children
        .iter()
        .map(|block| resolve_id(block, &mut ids))
        .collect();

    let mut terminal_ids: HashSet<String> = HashSet::new();
    let mut block_y = 0.0_f32;
    for (block, block_id) in root.children.iter().zip(&block_ids) {
        let terminal_id = terminal_id_for(block_id);
        let node_start = frame.nodes.len();
        let edge_start = frame.edges.len();
        let span = {
            let mut ctx = LayoutCtx {
                frame: &mut frame,
                ids: &mut ids,
                resolver,
                source,
                theme,
                config,
                terminal_id: &terminal_id,
            };
            layout_node(&mut ctx, block, block_id.clone(), None, 0.0, block_y, 0, None)
        };

        let terminal = terminal_node(&terminal_id, block, span, resolver, source, theme, config);
        frame.nodes.push(terminal);
        let node_end = frame.nodes.len();
        connect_dangling_leaves(
            &mut frame,
            theme,
            node_start..node_end,
            edge_start,
            block_id,
            &terminal_id,
        );

        block_y = span.next_y + config.node_height + config.block_spacing;
        terminal_ids.insert(terminal_id);
    }

    assemble(frame, &terminal_ids)
}

/// The terminal id is a pure function of the block id.
pub fn terminal_id_for(block_id: &str) -> String {
    format!("end-{block_id}")
}

/// One synthetic sink per top-level block, below the block's full
/// vertical extent and centered in its horizontal span.
fn terminal_node(
    terminal_id: &str,
    block: &ScriptNode,
    span: Span,
    resolver: &dyn DisplayResolver,
    source: Option<&SourceContext>,
    theme: &Theme,
    config: &LayoutConfig,
) -> DiagramNode {
    let mut synthetic = ScriptNode::new(NodeKind::Terminal);
    synthetic.id = Some(terminal_id.to_string());
    synthetic.label = block.label.clone();
    synthetic.start_line = block.end_line;
    synthetic.end_line = block.end_line;
    let display = resolve_display(resolver, source, theme, &synthetic);

    let x = (span.min_x + span.max_x) / 2.0 - config.node_width / 2.0;
    DiagramNode {
        id: terminal_id.to_string(),
        position: Position { x, y: span.next_y },
        size: Size {
            width: config.node_width,
            height: config.node_height,
        },
        visual_type: NodeKind::Terminal,
        display,
        origin: NodeOrigin {
            id: terminal_id.to_string(),
            kind: NodeKind::Terminal,
            label: block.label.clone(),
            start_line: block.end_line,
            end_line: block.end_line,
        },
    }
}

/// Final merge: edges that feed a terminal win identity collisions, and
/// the whole list is deduplicated by id keeping the first occurrence.
/// Independent construction paths may both decide a node reaches the
/// terminal; this pass makes that safe.
fn assemble(frame: LayoutFrame, terminal_ids: &HashSet<String>) -> Diagram {
    let (priority, rest): (Vec<DiagramEdge>, Vec<DiagramEdge>) = frame
        .edges
        .into_iter()
        .partition(|edge| terminal_ids.contains(&edge.target));
    let mut seen: HashSet<String> = HashSet::with_capacity(priority.len() + rest.len());
    let mut edges = Vec::with_capacity(priority.len() + rest.len());
    for edge in priority.into_iter().chain(rest) {
        if seen.insert(edge.id.clone()) {
            edges.push(edge);
        }
    }
    Diagram {
        nodes: frame.nodes,
        edges,
        diagnostics: frame.diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::ScriptDisplayResolver;

    fn node(kind: NodeKind, id: &str) -> ScriptNode {
        let mut node = ScriptNode::new(kind);
        node.id = Some(id.to_string());
        node
    }

    fn action(id: &str) -> ScriptNode {
        node(NodeKind::Action, id)
    }

    fn label(id: &str, children: Vec<ScriptNode>) -> ScriptNode {
        let mut label = node(NodeKind::Label, id);
        label.label = id.to_string();
        label.children = children;
        label
    }

    fn conditional(id: &str, children: Vec<ScriptNode>, false_branch: Vec<ScriptNode>) -> ScriptNode {
        let mut cond = node(NodeKind::Conditional, id);
        cond.children = children;
        cond.false_branch = false_branch;
        cond
    }

    fn menu(id: &str, options: Vec<ScriptNode>) -> ScriptNode {
        let mut menu = node(NodeKind::Menu, id);
        menu.children = options;
        menu
    }

    fn option(id: &str, children: Vec<ScriptNode>) -> ScriptNode {
        let mut option = node(NodeKind::MenuOption, id);
        option.children = children;
        option
    }

    fn root(blocks: Vec<ScriptNode>) -> ScriptNode {
        let mut root = ScriptNode::new(NodeKind::Action);
        root.children = blocks;
        root
    }

    fn diagram(root: &ScriptNode) -> Diagram {
        compute_diagram(
            root,
            &ScriptDisplayResolver,
            None,
            &Theme::default(),
            &LayoutConfig::default(),
        )
    }

    fn edge_triples(diagram: &Diagram) -> Vec<(&str, &str, Option<EdgeLabel>)> {
        diagram
            .edges
            .iter()
            .map(|edge| (edge.source.as_str(), edge.target.as_str(), edge.label))
            .collect()
    }

    fn find<'a>(diagram: &'a Diagram, id: &str) -> &'a DiagramNode {
        diagram
            .nodes
            .iter()
            .find(|node| node.id == id)
            .unwrap_or_else(|| panic!("node {id} missing"))
    }

    #[test]
    fn label_with_conditional_produces_expected_graph() {
        let tree = root(vec![label(
            "L",
            vec![
                action("A1"),
                conditional("C1", vec![action("A2")], vec![action("A3")]),
            ],
        )]);
        let result = diagram(&tree);

        let ids: Vec<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(result.nodes.len(), 6);
        for expected in ["L", "A1", "C1", "A2", "A3", "end-L"] {
            assert!(ids.contains(&expected), "missing node {expected}");
        }

        let triples = edge_triples(&result);
        assert_eq!(triples.len(), 6, "edges: {triples:?}");
        assert!(triples.contains(&("L", "A1", None)));
        assert!(triples.contains(&("A1", "C1", None)));
        assert!(triples.contains(&("C1", "A2", Some(EdgeLabel::True))));
        assert!(triples.contains(&("C1", "A3", Some(EdgeLabel::False))));
        assert!(triples.contains(&("A2", "end-L", None)));
        assert!(triples.contains(&("A3", "end-L", None)));
    }

    #[test]
    fn empty_false_branch_reconnects_to_fallthrough() {
        let tree = root(vec![label(
            "L",
            vec![
                conditional("C", vec![action("A")], Vec::new()),
                action("T"),
            ],
        )]);
        let result = diagram(&tree);
        let triples = edge_triples(&result);

        assert!(triples.contains(&("C", "A", Some(EdgeLabel::True))));
        assert!(triples.contains(&("C", "T", Some(EdgeLabel::False))));
        let labeled: Vec<_> = triples.iter().filter(|(s, _, l)| *s == "C" && l.is_some()).collect();
        assert_eq!(labeled.len(), 2);
        // No false-branch nodes were created.
        assert_eq!(result.nodes.len(), 5);
    }

    #[test]
    fn menu_options_fan_out_and_terminate() {
        let tree = root(vec![menu(
            "M",
            vec![
                option("O1", Vec::new()),
                option("O2", Vec::new()),
                option("O3", Vec::new()),
            ],
        )]);
        let result = diagram(&tree);
        let triples = edge_triples(&result);

        assert_eq!(result.nodes.len(), 5);
        for target in ["O1", "O2", "O3"] {
            assert!(triples.contains(&("M", target, None)));
            assert!(triples.contains(&(target, "end-M", None)));
        }
        assert_eq!(triples.len(), 6);
    }

    #[test]
    fn conditional_without_arms_still_yields_two_labeled_edges() {
        let tree = root(vec![label(
            "L",
            vec![conditional("C", Vec::new(), Vec::new())],
        )]);
        let result = diagram(&tree);
        let triples = edge_triples(&result);

        assert!(triples.contains(&("C", "end-L", Some(EdgeLabel::True))));
        assert!(triples.contains(&("C", "end-L", Some(EdgeLabel::False))));
    }

    #[test]
    fn branch_columns_sit_side_by_side_centered() {
        let tree = root(vec![label(
            "L",
            vec![conditional("C", vec![action("A2")], vec![action("A3")])],
        )]);
        let result = diagram(&tree);

        // Default geometry: width 220, branch gap 80. The two single-node
        // columns straddle the conditional's center at x 110.
        let left = find(&result, "A2");
        let right = find(&result, "A3");
        assert_eq!(left.position.x, -150.0);
        assert_eq!(right.position.x, 150.0);
        assert!(left.position.y > find(&result, "C").position.y);
        assert_eq!(left.position.y, right.position.y);
    }

    #[test]
    fn lone_branch_centers_directly_under_conditional() {
        let tree = root(vec![label(
            "L",
            vec![conditional("C", vec![action("A")], Vec::new())],
        )]);
        let result = diagram(&tree);
        assert_eq!(find(&result, "A").position.x, find(&result, "C").position.x);
    }

    #[test]
    fn menu_row_is_centered_under_menu() {
        let tree = root(vec![menu(
            "M",
            vec![
                option("O1", Vec::new()),
                option("O2", Vec::new()),
                option("O3", Vec::new()),
            ],
        )]);
        let result = diagram(&tree);

        // Row of three 220-wide columns with 60 gaps, centered at x 110.
        assert_eq!(find(&result, "O1").position.x, -280.0);
        assert_eq!(find(&result, "O2").position.x, 0.0);
        assert_eq!(find(&result, "O3").position.x, 280.0);
    }

    #[test]
    fn option_bodies_thread_to_following_sibling() {
        let tree = root(vec![label(
            "L",
            vec![
                menu("M", vec![option("O", vec![action("A")])]),
                action("N"),
            ],
        )]);
        let result = diagram(&tree);
        let triples = edge_triples(&result);

        assert!(triples.contains(&("M", "O", None)));
        assert!(triples.contains(&("O", "A", None)));
        assert!(triples.contains(&("A", "N", None)));
        // The menu's default sequential edge to its successor is replaced
        // by the option fan-out; N is reached through the option body.
        assert!(!triples.contains(&("M", "N", None)));
    }

    #[test]
    fn terminal_is_centered_in_block_span() {
        let tree = root(vec![label(
            "L",
            vec![conditional("C", vec![action("A2")], vec![action("A3")])],
        )]);
        let result = diagram(&tree);

        let terminal = find(&result, "end-L");
        assert_eq!(terminal.visual_type, NodeKind::Terminal);
        // Block span is [-150, 370]; its midpoint matches the root column.
        assert_eq!(terminal.position.x, 0.0);
        let lowest = result
            .nodes
            .iter()
            .filter(|node| node.id != "end-L")
            .map(|node| node.position.y)
            .fold(f32::MIN, f32::max);
        assert!(terminal.position.y > lowest);
    }

    #[test]
    fn blocks_stack_vertically_with_own_terminals() {
        let tree = root(vec![
            label("intro", vec![action("A")]),
            label("ending", vec![action("B")]),
        ]);
        let result = diagram(&tree);

        assert!(result.nodes.iter().any(|n| n.id == "end-intro"));
        assert!(result.nodes.iter().any(|n| n.id == "end-ending"));
        assert!(find(&result, "ending").position.y > find(&result, "end-intro").position.y);
        let triples = edge_triples(&result);
        assert!(triples.contains(&("A", "end-intro", None)));
        assert!(triples.contains(&("B", "end-ending", None)));
    }

    #[test]
    fn node_count_is_input_count_plus_one_terminal_per_block() {
        let tree = root(vec![
            label(
                "one",
                vec![
                    action("a"),
                    conditional("c", vec![action("t")], vec![action("f")]),
                ],
            ),
            label("two", vec![menu("m", vec![option("o", vec![action("x")])])]),
        ]);
        let input_count: usize = tree.children.iter().map(ScriptNode::count).sum();
        let result = diagram(&tree);
        assert_eq!(result.nodes.len(), input_count + 2);
    }

    #[test]
    fn edge_ids_are_unique_and_endpoints_exist() {
        let tree = root(vec![label(
            "L",
            vec![
                action("a"),
                conditional(
                    "c",
                    vec![menu("m", vec![option("o1", Vec::new()), option("o2", Vec::new())])],
                    Vec::new(),
                ),
                action("tail"),
            ],
        )]);
        let result = diagram(&tree);

        let mut ids: HashSet<&str> = HashSet::new();
        for edge in &result.edges {
            assert!(ids.insert(edge.id.as_str()), "duplicate edge id {}", edge.id);
        }
        let node_ids: HashSet<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in &result.edges {
            assert!(node_ids.contains(edge.source.as_str()), "dangling source {}", edge.source);
            assert!(node_ids.contains(edge.target.as_str()), "dangling target {}", edge.target);
        }
    }

    #[test]
    fn missing_ids_fall_back_to_deterministic_counters() {
        let mut block = ScriptNode::new(NodeKind::Label);
        block.label = "intro".to_string();
        block.children = vec![ScriptNode::new(NodeKind::Action), ScriptNode::new(NodeKind::Action)];
        let tree = root(vec![block]);

        let first = diagram(&tree);
        let second = diagram(&tree);
        let ids: Vec<&str> = first.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["node-0", "node-1", "node-2", "end-node-0"]);
        assert_eq!(first, second);
    }

    #[test]
    fn transform_is_deterministic() {
        let tree = root(vec![label(
            "L",
            vec![
                conditional("c", vec![action("t")], vec![action("f")]),
                menu("m", vec![option("o1", vec![action("x")]), option("o2", Vec::new())]),
            ],
        )]);
        let first = serde_json::to_string(&diagram(&tree)).unwrap();
        let second = serde_json::to_string(&diagram(&tree)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_root_returns_empty_diagram_with_diagnostic() {
        let result = diagram(&ScriptNode::new(NodeKind::Action));
        assert!(result.nodes.is_empty());
        assert!(result.edges.is_empty());
        assert_eq!(result.diagnostics, vec![Diagnostic::EmptyRoot]);
    }

    #[test]
    fn unknown_node_type_is_laid_out_as_leaf() {
        let tree: ScriptNode = serde_json::from_str(
            r#"{
                "children": [{
                    "id": "L", "node_type": "LabelBlock", "label_name": "L",
                    "children": [
                        {"id": "cam", "node_type": "CameraPan"},
                        {"id": "a", "node_type": "Action"}
                    ]
                }]
            }"#,
        )
        .unwrap();
        let result = diagram(&tree);

        let cam = find(&result, "cam");
        assert_eq!(cam.visual_type, NodeKind::Other);
        let triples = edge_triples(&result);
        assert!(triples.contains(&("L", "cam", None)));
        assert!(triples.contains(&("cam", "a", None)));
    }

    #[test]
    fn runaway_nesting_is_absorbed_with_a_diagnostic() {
        let mut inner = action("leaf");
        for index in 0..200 {
            inner = conditional(&format!("c{index}"), vec![inner], Vec::new());
        }
        let tree = root(vec![label("L", vec![inner])]);
        let result = diagram(&tree);

        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| matches!(d, Diagnostic::DepthLimit { .. })),
            "expected a depth diagnostic"
        );
        // Truncated or not, the result must stay internally consistent.
        let node_ids: HashSet<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in &result.edges {
            assert!(node_ids.contains(edge.source.as_str()));
            assert!(node_ids.contains(edge.target.as_str()));
        }
    }

    #[test]
    fn terminal_id_is_pure_function_of_block_id() {
        assert_eq!(terminal_id_for("intro"), "end-intro");
        assert_eq!(terminal_id_for("intro"), terminal_id_for("intro"));
    }
}
