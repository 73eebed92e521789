//! Structure-diagram post-processing.
//!
//! The rendering pass leaves `\structure` invocations as marked nodes. This
//! pass swaps each one for a [`Diagram`] drawn by a [`StructureRenderer`],
//! skipping nodes that cannot be drawn.

use std::collections::BTreeMap;

use thiserror::Error;

use super::{Node, NodeTag, RenderTree};

/// Height used when a structure does not specify one.
pub const DEFAULT_HEIGHT: u32 = 2;

/// A drawn structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    pub summary: String,
    pub height: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("unbalanced branch at position {0}")]
    UnbalancedBranch(usize),
    #[error("ring closure {0} is never closed")]
    UnclosedRing(u32),
    #[error("unterminated bracket atom")]
    UnterminatedAtom,
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("structure has no atoms")]
    Empty,
}

pub trait StructureRenderer {
    /// # Errors
    ///
    /// Returns a [`StructureError`] when `raw` cannot be drawn.
    fn draw(&self, raw: &str, height: u32) -> Result<Diagram, StructureError>;
}

/// Replace every [`NodeTag::Structure`] node with a diagram. Returns how
/// many nodes were replaced; the rest are left untouched.
pub fn apply_structure_pass(tree: &mut RenderTree, renderer: &dyn StructureRenderer) -> usize {
    let mut replaced = 0;
    for idx in tree.marked_indices(NodeTag::Structure) {
        let node = &tree.nodes[idx];
        let raw = node.attr("raw").map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            tracing::warn!(node = idx, "skipping structure without a raw string");
            continue;
        }
        let height = node
            .attr("height")
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map_or(Ok(DEFAULT_HEIGHT), str::parse::<u32>)
            .unwrap_or_else(|_| {
                tracing::warn!(node = idx, "invalid structure height, using default");
                DEFAULT_HEIGHT
            });
        match renderer.draw(raw, height) {
            Ok(diagram) => {
                tree.nodes[idx] = Node::Diagram(diagram);
                replaced += 1;
            }
            Err(err) => tracing::warn!(node = idx, raw, %err, "skipping structure"),
        }
    }
    replaced
}

/// Draws a structure as its heavy-atom formula, e.g. `⌬ C9NO3`.
///
/// Reads the organic subset, aromatic lowercase atoms and bracket atoms;
/// hydrogens are not counted. Branches and ring closures are checked for
/// balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaSummary;

impl StructureRenderer for FormulaSummary {
    fn draw(&self, raw: &str, height: u32) -> Result<Diagram, StructureError> {
        let counts = count_atoms(raw)?;
        Ok(Diagram {
            summary: format!("⌬ {}", hill_formula(&counts)),
            height,
        })
    }
}

fn count_atoms(smiles: &str) -> Result<BTreeMap<String, u32>, StructureError> {
    let chars: Vec<char> = smiles.chars().collect();
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut branches = Vec::new();
    let mut rings: BTreeMap<u32, usize> = BTreeMap::new();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '(' => branches.push(i),
            ')' => {
                branches.pop().ok_or(StructureError::UnbalancedBranch(i))?;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|&c| c == ']')
                    .ok_or(StructureError::UnterminatedAtom)?;
                let inner: String = chars[i + 1..i + close].iter().collect();
                if let Some(element) = bracket_element(&inner) {
                    add(&mut counts, &element);
                }
                i += close;
            }
            '0'..='9' | '%' => {
                let (label, used) = ring_label(&chars[i..]).ok_or(StructureError::UnexpectedChar(ch))?;
                if rings.remove(&label).is_none() {
                    rings.insert(label, i);
                }
                i += used - 1;
            }
            '-' | '=' | '#' | '$' | ':' | '/' | '\\' | '.' | '*' => {}
            'C' if chars.get(i + 1) == Some(&'l') => {
                add(&mut counts, "Cl");
                i += 1;
            }
            'B' if chars.get(i + 1) == Some(&'r') => {
                add(&mut counts, "Br");
                i += 1;
            }
            'B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I' => add(&mut counts, &ch.to_string()),
            'b' | 'c' | 'n' | 'o' | 'p' | 's' => add(&mut counts, &ch.to_ascii_uppercase().to_string()),
            c if c.is_whitespace() => {}
            c => return Err(StructureError::UnexpectedChar(c)),
        }
        i += 1;
    }
    if let Some(&open) = branches.last() {
        return Err(StructureError::UnbalancedBranch(open));
    }
    if let Some((&label, _)) = rings.iter().next() {
        return Err(StructureError::UnclosedRing(label));
    }
    if counts.is_empty() {
        return Err(StructureError::Empty);
    }
    Ok(counts)
}

/// A ring-closure label (`1` or `%12`) and how many chars it used.
fn ring_label(chars: &[char]) -> Option<(u32, usize)> {
    if chars.first() == Some(&'%') {
        let tens = chars.get(1)?.to_digit(10)?;
        let ones = chars.get(2)?.to_digit(10)?;
        return Some((tens * 10 + ones, 3));
    }
    Some((chars.first()?.to_digit(10)?, 1))
}

/// Element symbol of a bracket atom such as `13CH3`, `nH` or `O-`.
fn bracket_element(inner: &str) -> Option<String> {
    let rest = inner.trim_start_matches(|c: char| c.is_ascii_digit());
    let mut chars = rest.chars();
    let first = chars.next()?;
    let symbol = if first.is_ascii_lowercase() {
        first.to_ascii_uppercase().to_string()
    } else if first.is_ascii_uppercase() {
        let mut symbol = first.to_string();
        if let Some(second) = chars.next().filter(char::is_ascii_lowercase) {
            symbol.push(second);
        }
        symbol
    } else {
        return None;
    };
    (symbol != "H").then_some(symbol)
}

fn add(counts: &mut BTreeMap<String, u32>, element: &str) {
    *counts.entry(element.to_string()).or_default() += 1;
}

/// Carbon first, then the remaining elements alphabetically; counts of one
/// are omitted.
fn hill_formula(counts: &BTreeMap<String, u32>) -> String {
    let term = |element: &str, n: u32| {
        if n == 1 {
            element.to_string()
        } else {
            format!("{element}{n}")
        }
    };
    let mut out = String::new();
    if let Some(&n) = counts.get("C") {
        out.push_str(&term("C", n));
    }
    for (element, &n) in counts.iter().filter(|(e, _)| e.as_str() != "C") {
        out.push_str(&term(element, n));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(smiles: &str) -> Result<String, StructureError> {
        FormulaSummary.draw(smiles, 2).map(|d| d.summary)
    }

    #[test]
    fn test_seed_structure_summary() {
        assert_eq!(
            summary("C1=CC=C(C=C1)C(C(C(=O)O)N)O").unwrap(),
            "⌬ C9NO3"
        );
    }

    #[test]
    fn test_aromatic_and_halogens() {
        assert_eq!(summary("c1ccccc1Cl").unwrap(), "⌬ C6Cl");
        assert_eq!(summary("BrCCBr").unwrap(), "⌬ C2Br2");
    }

    #[test]
    fn test_bracket_atoms() {
        assert_eq!(summary("[13CH3][NH3+]").unwrap(), "⌬ CN");
        assert_eq!(summary("[Na+].[Cl-]").unwrap(), "⌬ ClNa");
        assert_eq!(summary("[H][H]"), Err(StructureError::Empty));
    }

    #[test]
    fn test_double_digit_ring_labels() {
        assert_eq!(summary("C%10CC%10").unwrap(), "⌬ C3");
    }

    #[test]
    fn test_malformed_structures() {
        assert_eq!(summary("C(C"), Err(StructureError::UnbalancedBranch(1)));
        assert_eq!(summary("CC)"), Err(StructureError::UnbalancedBranch(2)));
        assert_eq!(summary("C1CC"), Err(StructureError::UnclosedRing(1)));
        assert_eq!(summary("C[CH3"), Err(StructureError::UnterminatedAtom));
        assert_eq!(summary("C?"), Err(StructureError::UnexpectedChar('?')));
    }

    #[test]
    fn test_pass_replaces_structures_and_skips_bad_nodes() {
        let mut tree = RenderTree::new(vec![
            Node::Text("x ".into()),
            Node::marked(NodeTag::Structure, &[("raw", " CCO "), ("height", "5")]),
            Node::marked(NodeTag::Structure, &[("raw", "C(C")]),
            Node::marked(NodeTag::Structure, &[("height", "3")]),
            Node::marked(NodeTag::Structure, &[("raw", "N"), ("height", "tall")]),
        ]);
        let replaced = apply_structure_pass(&mut tree, &FormulaSummary);
        assert_eq!(replaced, 2);
        assert_eq!(
            tree.nodes[1],
            Node::Diagram(Diagram {
                summary: "⌬ C2O".into(),
                height: 5,
            })
        );
        assert!(matches!(tree.nodes[2], Node::Marked { .. }));
        assert!(matches!(tree.nodes[3], Node::Marked { .. }));
        assert_eq!(
            tree.nodes[4],
            Node::Diagram(Diagram {
                summary: "⌬ N".into(),
                height: DEFAULT_HEIGHT,
            })
        );
    }
}
