//! Reversible wrapping of lines in an `aligned` block.
//!
//! Enabling rewrites every top-level marker token (`=` or `->`) into its
//! anchored form (`&=` / `&->`) with single-space padding, ends each line
//! but the last with a `\\` row break, and encloses the result in
//! `\begin{aligned}` ... `\end{aligned}`. Disabling undoes all three.
//!
//! Row breaks added by enabling are written flush (`x\\`); breaks already
//! in the text are normalized to the spaced form (`x \\`) that Enter
//! inserts, so disabling strips only the ones it added. Markers inside
//! brace arguments are content (a SMILES bond, a `\ce` double bond) and
//! are left alone, except that reaction arrows are anchored directly
//! inside a top-level `\ce{..}`.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use super::buffer::{Document, Edit};

pub const BLOCK_BEGIN: &str = "\\begin{aligned}";
pub const BLOCK_END: &str = "\\end{aligned}";
/// Row break / line-continuation marker.
pub const LINE_BREAK: &str = "\\\\";

static MATH_ALIGNED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*&=[ \t]*").expect("math anchor pattern is valid"));
static CHEM_ALIGNED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*&->[ \t]*").expect("chem anchor pattern is valid"));
static CHEM_ALIGNED_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*&->\[").expect("labelled arrow pattern is valid"));
static TRAILING_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\\\\[ \t]*$").expect("row break pattern is valid"));

/// Whether Enter inserts row breaks (off) or plain newlines (on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentMode {
    #[default]
    Off,
    On,
}

impl AlignmentMode {
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

/// Which token marks the alignment column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignDomain {
    /// Equations, aligned at `=`.
    #[default]
    Math,
    /// Reactions, aligned at `->`.
    Chemistry,
}

impl AlignDomain {
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Math => "=",
            Self::Chemistry => "->",
        }
    }

    pub const fn aligned_marker(self) -> &'static str {
        match self {
            Self::Math => "&=",
            Self::Chemistry => "&->",
        }
    }

    /// Whether markers inside a brace group opened after `command` may be
    /// anchored. Only reached for groups opened at the top level.
    fn anchors_inside(self, command: Option<&str>) -> bool {
        matches!((self, command), (Self::Chemistry, Some("ce")))
    }

    /// Whether the marker at the start of `rest`, preceded by `prev`, is a
    /// lone marker rather than part of `<=`, `==`, `=>` or `<->`.
    fn is_lone_marker(self, prev: Option<char>, rest: &str) -> bool {
        let after = rest[self.marker().len()..].chars().next();
        match self {
            Self::Math => {
                !matches!(prev, Some('<' | '>' | '!' | ':' | '='))
                    && !matches!(after, Some('=' | '>'))
            }
            Self::Chemistry => prev != Some('<'),
        }
    }
}

/// Rewrite the markers of `text` that may be anchored into the padded
/// anchored form. An existing `&` before a marker is absorbed.
fn anchor_markers(text: &str, domain: AlignDomain) -> String {
    let marker = domain.marker();
    let anchor = format!(" {}", domain.aligned_marker());
    let mut out = String::with_capacity(text.len() + 16);
    // One entry per open brace: whether markers directly inside it anchor.
    let mut groups: Vec<bool> = Vec::new();
    let mut command: Option<&str> = None;
    let mut prev: Option<char> = None;
    let mut i = 0;

    while let Some(ch) = text[i..].chars().next() {
        let rest = &text[i..];
        if ch == '\\' {
            let name_len = rest[1..]
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(rest.len() - 1);
            if name_len > 0 {
                command = Some(&rest[1..=name_len]);
                out.push_str(&rest[..=name_len]);
                i += name_len + 1;
            } else {
                // Control symbol such as `\\` or `\{`: copy both chars.
                let len = 1 + rest[1..].chars().next().map_or(0, char::len_utf8);
                out.push_str(&rest[..len]);
                command = None;
                i += len;
            }
            prev = out.chars().next_back();
            continue;
        }

        let anchors_here = groups.last().copied().unwrap_or(true);
        match ch {
            '{' => {
                groups.push(groups.is_empty() && domain.anchors_inside(command));
                out.push(ch);
                i += 1;
            }
            '}' => {
                groups.pop();
                out.push(ch);
                i += 1;
            }
            _ if anchors_here => {
                let stripped = rest.strip_prefix('&').unwrap_or(rest);
                if stripped.starts_with(marker) && domain.is_lone_marker(prev, stripped) {
                    let kept = out.trim_end_matches([' ', '\t']).len();
                    out.truncate(kept);
                    out.push_str(&anchor);
                    i += rest.len() - stripped.len() + marker.len();
                    i += text[i..].len() - text[i..].trim_start_matches([' ', '\t']).len();
                    // `->[above]` keeps its label attached.
                    if !text[i..].starts_with('[') {
                        out.push(' ');
                    }
                } else {
                    out.push(ch);
                    i += ch.len_utf8();
                }
            }
            _ => {
                out.push(ch);
                i += ch.len_utf8();
            }
        }
        command = None;
        prev = out.chars().next_back();
    }
    out
}

/// Wrap `text` in an aligned block.
pub fn enable_text(text: &str, domain: AlignDomain) -> String {
    let anchored = anchor_markers(text, domain);
    let lines: Vec<&str> = anchored.split('\n').collect();
    let last = lines.len() - 1;
    let body = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if TRAILING_BREAK.is_match(line) {
                TRAILING_BREAK
                    .replace(line, NoExpand(&format!(" {LINE_BREAK}")))
                    .into_owned()
            } else if i == last {
                (*line).to_string()
            } else {
                format!("{}{LINE_BREAK}", line.trim_end())
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("{BLOCK_BEGIN}\n{body}\n{BLOCK_END}")
}

/// Unwrap every aligned block in `text`; text outside blocks is untouched.
///
/// Both anchored forms are restored whatever the active domain.
pub fn disable_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(begin) = rest.find(BLOCK_BEGIN) {
        let after_begin = &rest[begin + BLOCK_BEGIN.len()..];
        let Some(end) = after_begin.find(BLOCK_END) else {
            break;
        };
        out.push_str(&rest[..begin]);
        let inner = &after_begin[..end];
        let inner = inner.strip_prefix('\n').unwrap_or(inner);
        let inner = inner.strip_suffix('\n').unwrap_or(inner);
        out.push_str(&unalign_body(inner));
        rest = &after_begin[end + BLOCK_END.len()..];
    }
    out.push_str(rest);
    out
}

fn unalign_body(body: &str) -> String {
    let restored = MATH_ALIGNED.replace_all(body, NoExpand(" = "));
    let restored = CHEM_ALIGNED_LABEL.replace_all(&restored, NoExpand(" ->["));
    let restored = CHEM_ALIGNED.replace_all(&restored, NoExpand(" -> "));
    restored
        .split('\n')
        .map(strip_added_break)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop a flush `\\` row break; spaced breaks were in the text before.
fn strip_added_break(line: &str) -> &str {
    match line.strip_suffix(LINE_BREAK) {
        Some(content) if !content.ends_with([' ', '\t']) => content,
        _ => line,
    }
}

/// Edit that wraps the selected lines, or the whole document when nothing
/// is selected.
pub fn enable(doc: &Document, domain: AlignDomain) -> Edit {
    let selection = doc.selection();
    let range = if selection.is_empty() {
        0..doc.len_chars()
    } else {
        selected_lines(doc, selection.start(), selection.end())
    };
    let text = enable_text(&doc.slice(range.clone()), domain);
    let caret = text.chars().count();
    Edit::with_caret_offset(range, text, caret)
}

/// Edit that unwraps every aligned block in the document.
pub fn disable(doc: &Document) -> Edit {
    let text = disable_text(&doc.text());
    let caret = text.chars().count();
    Edit::with_caret_offset(0..doc.len_chars(), text, caret)
}

/// Flip the alignment state, returning the rewrite and the new mode.
pub fn toggle(doc: &Document, domain: AlignDomain, mode: AlignmentMode) -> (Edit, AlignmentMode) {
    let edit = match mode {
        AlignmentMode::Off => enable(doc, domain),
        AlignmentMode::On => disable(doc),
    };
    (edit, mode.toggled())
}

/// Char range from the start of the line holding `start` to the end of the
/// line holding `end` (newline excluded). A selection ending at the very
/// start of a line does not pull that line in.
fn selected_lines(doc: &Document, start: usize, end: usize) -> Range<usize> {
    let rope = doc.rope();
    let first = rope.char_to_line(start);
    let mut last = rope.char_to_line(end);
    if last > first && rope.line_to_char(last) == end {
        last -= 1;
    }
    rope.line_to_char(first)..rope.line_to_char(last) + doc.line_len(last)
}
