use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use storyflow::{
    LayoutConfig, NodeKind, ScriptDisplayResolver, ScriptNode, Theme, compute_diagram,
};

fn action(id: String) -> ScriptNode {
    let mut node = ScriptNode::new(NodeKind::Action);
    node.id = Some(id);
    node
}

/// Flat script: `blocks` labels, each a straight chain of `actions`.
fn chain_script(blocks: usize, actions: usize) -> ScriptNode {
    let mut root = ScriptNode::new(NodeKind::Action);
    for b in 0..blocks {
        let mut label = ScriptNode::new(NodeKind::Label);
        label.id = Some(format!("label_{b}"));
        label.label = format!("label_{b}");
        label.children = (0..actions).map(|a| action(format!("a_{b}_{a}"))).collect();
        root.children.push(label);
    }
    root
}

/// One label holding a conditional ladder `depth` levels deep, each level
/// with a populated false branch.
fn ladder_script(depth: usize) -> ScriptNode {
    let mut inner = action("leaf".to_string());
    for level in 0..depth {
        let mut cond = ScriptNode::new(NodeKind::Conditional);
        cond.id = Some(format!("if_{level}"));
        cond.children = vec![inner];
        cond.false_branch = vec![action(format!("else_{level}"))];
        inner = cond;
    }
    let mut label = ScriptNode::new(NodeKind::Label);
    label.id = Some("ladder".to_string());
    label.label = "ladder".to_string();
    label.children = vec![inner];
    let mut root = ScriptNode::new(NodeKind::Action);
    root.children = vec![label];
    root
}

/// One label with a single menu of `options` options, each a short body.
fn fanout_script(options: usize, body: usize) -> ScriptNode {
    let mut menu = ScriptNode::new(NodeKind::Menu);
    menu.id = Some("menu".to_string());
    for o in 0..options {
        let mut option = ScriptNode::new(NodeKind::MenuOption);
        option.id = Some(format!("opt_{o}"));
        option.label = format!("\"choice {o}\"");
        option.children = (0..body).map(|a| action(format!("body_{o}_{a}"))).collect();
        menu.children.push(option);
    }
    let mut label = ScriptNode::new(NodeKind::Label);
    label.id = Some("hub".to_string());
    label.label = "hub".to_string();
    label.children = vec![menu];
    let mut root = ScriptNode::new(NodeKind::Action);
    root.children = vec![label];
    root
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let theme = Theme::default();
    let config = LayoutConfig::default();

    let cases = [
        ("chains_10x20", chain_script(10, 20)),
        ("chains_50x50", chain_script(50, 50)),
        ("ladder_30", ladder_script(30)),
        ("ladder_100", ladder_script(100)),
        ("fanout_8x5", fanout_script(8, 5)),
        ("fanout_40x3", fanout_script(40, 3)),
    ];

    for (name, tree) in &cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), tree, |b, tree| {
            b.iter(|| {
                let diagram = compute_diagram(
                    black_box(tree),
                    &ScriptDisplayResolver,
                    None,
                    &theme,
                    &config,
                );
                black_box(diagram.nodes.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
