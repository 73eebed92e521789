use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::buffer::{Document, Edit, Selection};

/// An innermost brace group: `{` ... `}` with no braces inside.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").expect("placeholder pattern is valid"));

/// A named template inserted from the snippet bar or palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    /// Short label shown in the snippet bar.
    pub label: String,
    /// Text inserted into the document.
    pub insert_text: String,
    #[serde(default)]
    pub description: String,
}

impl Snippet {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        insert_text: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            insert_text: insert_text.into(),
            description: description.into(),
        }
    }

    /// Content ranges of every placeholder, in chars relative to
    /// `insert_text`, in order. The braces themselves are excluded.
    pub fn placeholders(&self) -> Vec<Range<usize>> {
        let text = self.insert_text.as_str();
        PLACEHOLDER
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| char_len(&text[..m.start()])..char_len(&text[..m.end()]))
            .collect()
    }
}

/// Build the edit that inserts `snippet` at the document's selection.
///
/// With a selection, the selected text fills the first placeholder and the
/// next placeholder (if any) becomes the new selection; otherwise the caret
/// lands after the inserted text. Without a selection, the first
/// placeholder is selected, or the caret lands after the text when the
/// template has none.
pub fn insert(doc: &Document, snippet: &Snippet) -> Edit {
    let selection = doc.selection();
    let start = selection.start();
    let template = snippet.insert_text.as_str();

    if selection.is_empty() {
        let next = match PLACEHOLDER.captures(template).and_then(|caps| caps.get(1)) {
            Some(content) => Selection::range(
                start + char_len(&template[..content.start()]),
                start + char_len(&template[..content.end()]),
            ),
            None => Selection::caret(start + char_len(template)),
        };
        return Edit::new(selection.to_range(), template, next);
    }

    let selected = doc.selected_text();
    let Some(first) = PLACEHOLDER.find(template) else {
        return Edit::with_caret_offset(selection.to_range(), template, char_len(template));
    };

    let mut text = String::with_capacity(template.len() + selected.len());
    text.push_str(&template[..first.start()]);
    text.push('{');
    text.push_str(&selected);
    text.push('}');
    let consumed = text.len();
    text.push_str(&template[first.end()..]);

    let next = PLACEHOLDER
        .captures(&text[consumed..])
        .and_then(|caps| caps.get(1))
        .map_or_else(
            || Selection::caret(start + char_len(&text)),
            |content| {
                Selection::range(
                    start + char_len(&text[..consumed + content.start()]),
                    start + char_len(&text[..consumed + content.end()]),
                )
            },
        );
    Edit::new(selection.to_range(), text, next)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
