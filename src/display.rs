use crate::ir::{NodeKind, ScriptNode};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static SPEAKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^([A-Za-z_][A-Za-z0-9_]*)\s+""#).unwrap());
static JUMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^jump\s+([A-Za-z0-9_.]+)").unwrap());
static CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^call\s+([A-Za-z0-9_.]+)").unwrap());

/// Body excerpts longer than this many lines collapse to a head, a
/// `<...>` marker, and a tail.
const SUMMARY_FULL_LIMIT: usize = 14;
const SUMMARY_EDGE_LINES: usize = 6;

/// Card content for one diagram node. The layout engine passes this
/// through untouched; only the renderer interprets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeDisplay {
    pub title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// The raw script text a tree was parsed from, split into lines once so
/// node line spans can be excerpted cheaply.
#[derive(Debug, Clone)]
pub struct SourceContext {
    lines: Vec<String>,
}

impl SourceContext {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Inclusive line span, clamped to the script length.
    fn span(&self, start: usize, end: usize) -> &[String] {
        let start = start.min(self.lines.len());
        let end = (end + 1).min(self.lines.len());
        if start >= end {
            return &[];
        }
        &self.lines[start..end]
    }
}

/// Supplies title/summary/status metadata for a raw node. Implemented by
/// the embedding editor; `ScriptDisplayResolver` is the stock
/// implementation used when the caller has nothing fancier.
pub trait DisplayResolver {
    fn resolve(&self, node: &ScriptNode, source: Option<&SourceContext>) -> NodeDisplay;
}

/// Default resolver: titles from declarations, summaries excerpted from
/// the node's line span, speaker and flow-control detection for actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDisplayResolver;

impl DisplayResolver for ScriptDisplayResolver {
    fn resolve(&self, node: &ScriptNode, source: Option<&SourceContext>) -> NodeDisplay {
        if node.kind == NodeKind::Terminal {
            let title = if node.label.is_empty() {
                "End".to_string()
            } else {
                format!("End of {}", node.label)
            };
            return NodeDisplay {
                title,
                tag: Some(kind_tag(node.kind).to_string()),
                ..NodeDisplay::default()
            };
        }

        let span = source.map(|ctx| ctx.span(node.start_line, node.end_line));
        let summary = span.map(summarize_span).unwrap_or_default();
        let title = resolve_title(node, source);
        let (status, author) = span
            .map(|lines| (detect_flow_control(lines), detect_speaker(lines)))
            .unwrap_or((None, None));

        NodeDisplay {
            title,
            summary,
            status,
            author,
            tag: Some(kind_tag(node.kind).to_string()),
            color: None,
        }
    }
}

fn kind_tag(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Label => "label",
        NodeKind::Action => "action",
        NodeKind::Conditional => "branch",
        NodeKind::Menu => "menu",
        NodeKind::MenuOption => "choice",
        NodeKind::Terminal => "end",
        NodeKind::Other => "action",
    }
}

fn resolve_title(node: &ScriptNode, source: Option<&SourceContext>) -> String {
    match node.kind {
        NodeKind::Label => {
            if node.label.is_empty() {
                "label".to_string()
            } else {
                node.label.clone()
            }
        }
        NodeKind::MenuOption => node.label.trim_matches('"').to_string(),
        _ => {
            // A statement declaration on the first line is its own best title.
            if let Some(first) = source.and_then(|ctx| ctx.line(node.start_line)) {
                let trimmed = first.trim();
                if is_statement(trimmed) && trimmed.ends_with(':') {
                    return trimmed.trim_end_matches(':').trim().to_string();
                }
            }
            if !node.label.is_empty() {
                return node.label.clone();
            }
            source
                .and_then(|ctx| ctx.span(node.start_line, node.end_line).iter().find(|l| !l.trim().is_empty()))
                .map(|l| l.trim().to_string())
                .unwrap_or_else(|| kind_tag(node.kind).to_string())
        }
    }
}

fn is_statement(line: &str) -> bool {
    line.starts_with("if ")
        || line.starts_with("elif ")
        || line.starts_with("else")
        || line.starts_with("menu")
}

/// Excerpt a line span the way the editor shows node previews: short
/// bodies whole, long ones as head, `<...>`, tail.
fn summarize_span(lines: &[String]) -> String {
    if lines.len() > SUMMARY_FULL_LIMIT {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(
            lines
                .iter()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .take(SUMMARY_EDGE_LINES),
        );
        parts.push("<...>");
        let mut tail: Vec<&str> = lines
            .iter()
            .rev()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .take(SUMMARY_EDGE_LINES)
            .collect();
        tail.reverse();
        parts.extend(tail);
        parts.join("\n")
    } else {
        lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn detect_flow_control(lines: &[String]) -> Option<String> {
    for line in lines {
        let trimmed = line.trim();
        if let Some(caps) = JUMP_RE.captures(trimmed) {
            return Some(format!("jump → {}", &caps[1]));
        }
        if let Some(caps) = CALL_RE.captures(trimmed) {
            return Some(format!("call → {}", &caps[1]));
        }
        if trimmed == "return" {
            return Some("return".to_string());
        }
    }
    None
}

fn detect_speaker(lines: &[String]) -> Option<String> {
    lines.iter().find_map(|line| {
        SPEAKER_RE
            .captures(line.trim())
            .map(|caps| caps[1].to_string())
    })
}
