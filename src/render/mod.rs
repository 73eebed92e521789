//! Rendering collaborator interface.
//!
//! The editor never renders markup itself. It hands the delimited buffer
//! text, a macro table and a trust flag to a [`MathRenderer`] and gets back
//! a [`RenderTree`] (or a [`RenderError`] to show in place of the preview).
//! Marked nodes left in the tree are post-processed by
//! [`structure::apply_structure_pass`].

mod macros;
pub mod preview;
pub mod structure;

use thiserror::Error;

pub use macros::{MAX_MACRO_DEPTH, MacroDef, MacroTable, expand_macros};
pub use preview::UnicodePreview;
pub use structure::{Diagram, FormulaSummary, StructureError, StructureRenderer, apply_structure_pass};

/// Diagnostics raised while rendering. Shown inline; never fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unbalanced braces at position {position}")]
    UnbalancedGroup { position: usize },
    #[error("\\{command} is missing an argument")]
    MissingArgument { command: String },
    #[error("macro expansion exceeded depth {limit}")]
    MacroDepth { limit: usize },
    #[error("\\{command} is not allowed without trust")]
    Untrusted { command: String },
}

/// Stable capability tag for nodes awaiting post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    /// A chemical structure to be drawn by a [`StructureRenderer`].
    Structure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    LineBreak,
    Marked {
        tag: NodeTag,
        attrs: Vec<(String, String)>,
    },
    Diagram(Diagram),
}

impl Node {
    pub fn marked(tag: NodeTag, attrs: &[(&str, &str)]) -> Self {
        Self::Marked {
            tag,
            attrs: attrs
                .iter()
                .map(|&(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Attribute value of a marked node.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Self::Marked { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

/// One output row of a rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    /// Height in text rows; diagrams may ask for more than one.
    pub height: u32,
}

/// Output of a [`MathRenderer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderTree {
    pub nodes: Vec<Node>,
}

impl RenderTree {
    pub const fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Append text, merging with a trailing text node.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.nodes.last_mut() {
            last.push_str(text);
        } else {
            self.nodes.push(Node::Text(text.to_string()));
        }
    }

    pub fn push(&mut self, node: Node) {
        match node {
            Node::Text(text) => self.push_text(&text),
            other => self.nodes.push(other),
        }
    }

    pub fn extend(&mut self, other: Self) {
        for node in other.nodes {
            self.push(node);
        }
    }

    /// All text of the tree on one line, as used inside fractions and
    /// scripts. Marked nodes contribute their `raw` attribute.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::LineBreak => out.push(' '),
                Node::Marked { .. } => out.push_str(node.attr("raw").unwrap_or_default()),
                Node::Diagram(diagram) => out.push_str(&diagram.summary),
            }
        }
        out
    }

    /// Rows split at line breaks with whitespace collapsed. Blank rows are
    /// dropped.
    pub fn lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut text = String::new();
        let mut height = 1;
        let mut finish = |text: &mut String, height: &mut u32| {
            let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !collapsed.is_empty() {
                lines.push(Line {
                    text: collapsed,
                    height: *height,
                });
            }
            text.clear();
            *height = 1;
        };
        for node in &self.nodes {
            match node {
                Node::Text(t) => text.push_str(t),
                Node::LineBreak => finish(&mut text, &mut height),
                Node::Marked { tag, .. } => {
                    text.push_str(&format!(
                        "[{tag:?}: {}]",
                        node.attr("raw").unwrap_or_default()
                    ));
                }
                Node::Diagram(diagram) => {
                    text.push_str(&diagram.summary);
                    height = height.max(diagram.height);
                }
            }
        }
        finish(&mut text, &mut height);
        lines
    }

    /// Indices of nodes carrying `tag`.
    pub fn marked_indices(&self, tag: NodeTag) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, Node::Marked { tag: t, .. } if *t == tag))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Inputs passed alongside the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub display_delimiters: (String, String),
    pub macros: MacroTable,
    /// Whether macros may emit raw markup such as `\structure`.
    pub trust: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            display_delimiters: ("$$".to_string(), "$$".to_string()),
            macros: MacroTable::default(),
            trust: true,
        }
    }
}

impl RenderOptions {
    #[must_use]
    pub fn with_trust(mut self, trust: bool) -> Self {
        self.trust = trust;
        self
    }

    /// Enclose `source` in the display delimiters.
    pub fn wrap_display(&self, source: &str) -> String {
        let (left, right) = &self.display_delimiters;
        format!("{left}{source}{right}")
    }

    /// Inverse of [`Self::wrap_display`]; undelimited input is returned
    /// unchanged.
    pub fn strip_display<'a>(&self, input: &'a str) -> &'a str {
        let (left, right) = &self.display_delimiters;
        input
            .strip_prefix(left.as_str())
            .and_then(|rest| rest.strip_suffix(right.as_str()))
            .unwrap_or(input)
    }
}

/// Turns display-delimited markup into a [`RenderTree`].
pub trait MathRenderer {
    /// # Errors
    ///
    /// Returns a [`RenderError`] describing malformed input.
    fn render(&self, input: &str, options: &RenderOptions) -> Result<RenderTree, RenderError>;
}

/// Render buffer text: wrap it in the display delimiters, render, then run
/// the structure pass.
///
/// # Errors
///
/// Propagates the renderer's diagnostic.
pub fn render_source(
    renderer: &dyn MathRenderer,
    structures: &dyn StructureRenderer,
    source: &str,
    options: &RenderOptions,
) -> Result<RenderTree, RenderError> {
    let mut tree = renderer.render(&options.wrap_display(source), options)?;
    apply_structure_pass(&mut tree, structures);
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_wrap_round_trip() {
        let options = RenderOptions::default();
        let wrapped = options.wrap_display("x^2");
        assert_eq!(wrapped, "$$x^2$$");
        assert_eq!(options.strip_display(&wrapped), "x^2");
        assert_eq!(options.strip_display("x^2"), "x^2");
    }

    #[test]
    fn test_push_text_merges_adjacent_text() {
        let mut tree = RenderTree::default();
        tree.push_text("a");
        tree.push(Node::Text("b".into()));
        tree.push(Node::LineBreak);
        tree.push_text("c");
        assert_eq!(
            tree.nodes,
            vec![Node::Text("ab".into()), Node::LineBreak, Node::Text("c".into())]
        );
    }

    #[test]
    fn test_lines_collapse_whitespace_and_drop_blank_rows() {
        let tree = RenderTree::new(vec![
            Node::Text("  a  =   b ".into()),
            Node::LineBreak,
            Node::Text("   ".into()),
            Node::LineBreak,
            Node::Diagram(Diagram {
                summary: "⌬ CO".into(),
                height: 3,
            }),
        ]);
        let lines = tree.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "a = b");
        assert_eq!(lines[0].height, 1);
        assert_eq!(lines[1].text, "⌬ CO");
        assert_eq!(lines[1].height, 3);
    }

    #[test]
    fn test_marked_node_attrs() {
        let node = Node::marked(NodeTag::Structure, &[("raw", "CCO"), ("height", "2")]);
        assert_eq!(node.attr("raw"), Some("CCO"));
        assert_eq!(node.attr("missing"), None);
        let tree = RenderTree::new(vec![Node::Text("x".into()), node]);
        assert_eq!(tree.marked_indices(NodeTag::Structure), vec![1]);
        assert_eq!(tree.flatten(), "xCCO");
    }

    #[test]
    fn test_error_messages_are_readable() {
        let err = RenderError::MissingArgument {
            command: "frac".into(),
        };
        assert_eq!(err.to_string(), "\\frac is missing an argument");
    }
}
