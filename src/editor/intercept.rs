//! Keystroke policy: decides which keys become assisted edits.
//!
//! Rules are tried in a fixed order and only the first one that applies
//! fires. Keys no rule claims return `None` and fall through to native
//! insertion.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::align::AlignmentMode;
use super::buffer::{Document, Edit};
use super::matcher::{BracketPair, OpenMatch, SCALED_PREFIX, match_open};

/// Tokens whose presence inside a bracket pair makes Space scale it.
pub const SCALING_TRIGGERS: [&str; 3] = ["\\sum", "\\int", "\\frac"];
/// Closing counterpart of [`SCALED_PREFIX`].
pub const SCALED_SUFFIX: &str = "\\right";
/// Row break inserted by a plain Enter outside alignment mode.
pub const LINE_CONTINUATION: &str = " \\\\\n";

/// What an intercepted key asks the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intercept {
    Edit(Edit),
    ToggleAlignment,
}

/// Map a key press to an assisted action, or `None` for native handling.
pub fn intercept(doc: &Document, key: &KeyEvent, mode: AlignmentMode) -> Option<Intercept> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    let (rule, edit) = match key.code {
        KeyCode::Char(ch) if !ctrl && !alt => match ch {
            '(' | '[' | '{' => ("auto-pair", auto_pair(doc, BracketPair::for_open(ch)?)),
            '^' => ("superscript", superscript(doc)),
            '/' => ("fraction", fraction(doc)),
            ' ' => ("scale", scale_delimiters(doc)?),
            _ => return None,
        },
        KeyCode::Enter if ctrl => return Some(Intercept::ToggleAlignment),
        KeyCode::Enter if alt => ("newline", bare_newline(doc)),
        KeyCode::Enter if key.modifiers.is_empty() && !mode.is_on() => {
            ("continuation", line_continuation(doc))
        }
        _ => return None,
    };
    tracing::debug!(rule, range = ?edit.range, "intercepted key");
    Some(Intercept::Edit(edit))
}

/// Insert `pair` in place of the selection with the caret between them.
pub fn auto_pair(doc: &Document, pair: BracketPair) -> Edit {
    let text: String = [pair.open, pair.close].iter().collect();
    Edit::with_caret_offset(doc.selection().to_range(), text, 1)
}

/// `^{}` with the caret inside the braces.
pub fn superscript(doc: &Document) -> Edit {
    Edit::with_caret_offset(doc.selection().to_range(), "^{}", 2)
}

/// Turn the segment before the caret into the numerator of a fraction.
///
/// The segment starts after the nearest space, newline or `\\` before the
/// selection. Its surrounding whitespace is trimmed and the caret lands in
/// the empty denominator.
pub fn fraction(doc: &Document) -> Edit {
    let selection = doc.selection();
    let segment_start = segment_start(doc, selection.start());
    let numerator = doc.slice(segment_start..selection.start());
    let text = format!("\\frac{{{}}}{{}}", numerator.trim());
    let caret = text.chars().count() - 1;
    Edit::with_caret_offset(segment_start..selection.end(), text, caret)
}

fn segment_start(doc: &Document, before: usize) -> usize {
    let mut chars = doc.rope().chars_at(before);
    let mut idx = before;
    let mut prev_backslash = false;
    while let Some(ch) = chars.prev() {
        idx -= 1;
        if ch == ' ' || ch == '\n' {
            return idx + 1;
        }
        // Scanning backward, `prev_backslash` means the char after `idx`
        // was a backslash, so `idx` is the first half of a `\\`.
        if ch == '\\' && prev_backslash {
            return idx + 2;
        }
        prev_backslash = ch == '\\';
    }
    0
}

/// Wrap the bracket pair closed just before the caret in
/// `\left` ... `\right` when its content holds a scaling trigger.
///
/// Returns `None` (native Space) when the caret does not follow `)` or `]`,
/// the pair is unbalanced or already scaled, or no trigger is present.
pub fn scale_delimiters(doc: &Document) -> Option<Edit> {
    let selection = doc.selection();
    if !selection.is_empty() {
        return None;
    }
    let caret = selection.head;
    let close = doc.char_at(caret.checked_sub(1)?)?;
    let pair = match close {
        ')' => BracketPair::PAREN,
        ']' => BracketPair::SQUARE,
        _ => return None,
    };
    let OpenMatch::Bare(open) = match_open(doc.rope(), caret, pair)? else {
        return None;
    };
    let inner = doc.slice(open + 1..caret - 1);
    if !SCALING_TRIGGERS.iter().any(|trigger| inner.contains(trigger)) {
        return None;
    }
    let text = format!(
        "{SCALED_PREFIX}{}{SCALED_SUFFIX}{close}",
        doc.slice(open..caret - 1)
    );
    let caret_offset = text.chars().count();
    Some(Edit::with_caret_offset(open..caret, text, caret_offset))
}

pub fn bare_newline(doc: &Document) -> Edit {
    Edit::with_caret_offset(doc.selection().to_range(), "\n", 1)
}

pub fn line_continuation(doc: &Document) -> Edit {
    Edit::with_caret_offset(
        doc.selection().to_range(),
        LINE_CONTINUATION,
        LINE_CONTINUATION.chars().count(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Selection;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn at_end(text: &str) -> Document {
        let doc = Document::from_text(text);
        let len = doc.len_chars();
        doc.with_selection(Selection::caret(len))
    }

    /// Run a key through the interceptor and commit the result, or fall
    /// back to native insertion like the host does.
    fn press(mut doc: Document, event: KeyEvent, mode: AlignmentMode) -> Document {
        match intercept(&doc, &event, mode) {
            Some(Intercept::Edit(edit)) => {
                let pending = doc.apply_edit(&edit).unwrap();
                doc.place_caret(pending);
            }
            Some(Intercept::ToggleAlignment) => panic!("unexpected toggle"),
            None => match event.code {
                KeyCode::Char(ch) => doc.insert_char(ch),
                KeyCode::Enter => doc.insert_char('\n'),
                _ => {}
            },
        }
        doc
    }

    fn type_str(mut doc: Document, s: &str) -> Document {
        for ch in s.chars() {
            doc = press(doc, key(KeyCode::Char(ch)), AlignmentMode::Off);
        }
        doc
    }

    #[test]
    fn test_auto_pair_places_caret_between() {
        for (open, pair) in [('(', "()"), ('[', "[]"), ('{', "{}")] {
            let doc = press(at_end("x"), key(KeyCode::Char(open)), AlignmentMode::Off);
            assert_eq!(doc.text(), format!("x{pair}"));
            assert_eq!(doc.selection(), Selection::caret(2));
        }
    }

    #[test]
    fn test_auto_pair_replaces_selection() {
        let doc = Document::from_text("abc").with_selection(Selection::range(1, 2));
        let doc = press(doc, key(KeyCode::Char('(')), AlignmentMode::Off);
        assert_eq!(doc.text(), "a()c");
        assert_eq!(doc.selection(), Selection::caret(2));
    }

    #[test]
    fn test_auto_pair_ignored_with_ctrl() {
        let event = KeyEvent::new(KeyCode::Char('('), KeyModifiers::CONTROL);
        assert_eq!(intercept(&at_end(""), &event, AlignmentMode::Off), None);
    }

    #[test]
    fn test_shifted_chars_still_intercepted() {
        let event = KeyEvent::new(KeyCode::Char('^'), KeyModifiers::SHIFT);
        assert!(intercept(&at_end("x"), &event, AlignmentMode::Off).is_some());
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut event = key(KeyCode::Char('('));
        event.kind = KeyEventKind::Release;
        assert_eq!(intercept(&at_end(""), &event, AlignmentMode::Off), None);
    }

    #[test]
    fn test_superscript_caret_inside_braces() {
        let doc = press(at_end("x"), key(KeyCode::Char('^')), AlignmentMode::Off);
        assert_eq!(doc.text(), "x^{}");
        assert_eq!(doc.selection(), Selection::caret(3));
    }

    #[test]
    fn test_fraction_uses_segment_after_last_space() {
        let doc = press(at_end("a + b"), key(KeyCode::Char('/')), AlignmentMode::Off);
        assert_eq!(doc.text(), "a + \\frac{b}{}");
        assert_eq!(doc.selection(), Selection::caret(13));
    }

    #[test]
    fn test_fraction_takes_whole_unspaced_expression() {
        let doc = press(at_end("y = a+b"), key(KeyCode::Char('/')), AlignmentMode::Off);
        assert_eq!(doc.text(), "y = \\frac{a+b}{}");
        // Typing the denominator fills the braces.
        let doc = type_str(doc, "2");
        assert_eq!(doc.text(), "y = \\frac{a+b}{2}");
    }

    #[test]
    fn test_fraction_at_document_start_takes_everything() {
        let doc = press(at_end("ab"), key(KeyCode::Char('/')), AlignmentMode::Off);
        assert_eq!(doc.text(), "\\frac{ab}{}");
        assert_eq!(doc.selection(), Selection::caret(10));
    }

    #[test]
    fn test_fraction_stops_at_newline_and_row_break() {
        let doc = press(at_end("x\ny"), key(KeyCode::Char('/')), AlignmentMode::Off);
        assert_eq!(doc.text(), "x\n\\frac{y}{}");

        let doc = press(at_end("a\\\\b"), key(KeyCode::Char('/')), AlignmentMode::Off);
        assert_eq!(doc.text(), "a\\\\\\frac{b}{}");
    }

    #[test]
    fn test_fraction_with_empty_segment() {
        let doc = press(at_end("x "), key(KeyCode::Char('/')), AlignmentMode::Off);
        assert_eq!(doc.text(), "x \\frac{}{}");
        assert_eq!(doc.selection(), Selection::caret(10));
    }

    #[test]
    fn test_fraction_keeps_text_after_caret() {
        let doc = Document::from_text("a b c").with_selection(Selection::caret(3));
        let doc = press(doc, key(KeyCode::Char('/')), AlignmentMode::Off);
        assert_eq!(doc.text(), "a \\frac{b}{} c");
    }

    #[test]
    fn test_space_scales_brackets_around_fraction() {
        let doc = at_end("(\\frac{a}{b})");
        let doc = press(doc, key(KeyCode::Char(' ')), AlignmentMode::Off);
        assert_eq!(doc.text(), "\\left(\\frac{a}{b}\\right)");
        assert_eq!(doc.selection(), Selection::caret(doc.len_chars()));
    }

    #[test]
    fn test_space_scales_square_brackets_with_sum() {
        let doc = at_end("x[\\sum_i a_i]");
        let doc = press(doc, key(KeyCode::Char(' ')), AlignmentMode::Off);
        assert_eq!(doc.text(), "x\\left[\\sum_i a_i\\right]");
    }

    #[test]
    fn test_scaling_happens_exactly_once() {
        let doc = at_end("(\\int f)");
        let doc = press(doc, key(KeyCode::Char(' ')), AlignmentMode::Off);
        assert_eq!(doc.text(), "\\left(\\int f\\right)");

        // The second Space falls through to a plain space.
        let doc = press(doc, key(KeyCode::Char(' ')), AlignmentMode::Off);
        assert_eq!(doc.text(), "\\left(\\int f\\right) ");
    }

    #[test]
    fn test_space_without_trigger_is_native() {
        let doc = at_end("(a+b)");
        assert_eq!(scale_delimiters(&doc), None);
        let doc = press(doc, key(KeyCode::Char(' ')), AlignmentMode::Off);
        assert_eq!(doc.text(), "(a+b) ");
    }

    #[test]
    fn test_space_after_unbalanced_close_is_native() {
        assert_eq!(scale_delimiters(&at_end("\\frac{a}{b})")), None);
    }

    #[test]
    fn test_space_with_selection_is_native() {
        let doc = Document::from_text("(\\frac{a}{b})").with_selection(Selection::range(0, 13));
        assert_eq!(scale_delimiters(&doc), None);
    }

    #[test]
    fn test_ctrl_enter_toggles_alignment() {
        let event = KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL);
        assert_eq!(
            intercept(&at_end("a = b"), &event, AlignmentMode::Off),
            Some(Intercept::ToggleAlignment)
        );
        assert_eq!(
            intercept(&at_end("a = b"), &event, AlignmentMode::On),
            Some(Intercept::ToggleAlignment)
        );
    }

    #[test]
    fn test_alt_enter_inserts_bare_newline() {
        let event = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        let doc = press(at_end("a"), event, AlignmentMode::Off);
        assert_eq!(doc.text(), "a\n");
        assert_eq!(doc.selection(), Selection::caret(2));
    }

    #[test]
    fn test_enter_in_alignment_mode_is_native() {
        assert_eq!(
            intercept(&at_end("a"), &key(KeyCode::Enter), AlignmentMode::On),
            None
        );
    }

    #[test]
    fn test_shift_enter_is_native() {
        let event = KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT);
        assert_eq!(intercept(&at_end("a"), &event, AlignmentMode::Off), None);
    }

    #[test]
    fn test_plain_chars_fall_through() {
        assert_eq!(
            intercept(&at_end(""), &key(KeyCode::Char('b')), AlignmentMode::Off),
            None
        );
        assert_eq!(
            intercept(&at_end(""), &key(KeyCode::Backspace), AlignmentMode::Off),
            None
        );
    }

    #[test]
    fn test_seed_scenario_enter_appends_continuation() {
        let seed = "f(x) = \\frac{-b \\pm \\sqrt{b^2-4ac}}{2a}";
        let doc = at_end(seed);

        // Typing "b2" is ordinary text; only an explicit `^` expands.
        let doc = type_str(doc, " b2");
        assert_eq!(doc.text(), format!("{seed} b2"));

        let doc = press(doc, key(KeyCode::Enter), AlignmentMode::Off);
        assert_eq!(doc.text(), format!("{seed} b2 \\\\\n"));
        assert_eq!(doc.selection(), Selection::caret(doc.len_chars()));
    }

    #[test]
    fn test_continuation_mid_text_leaves_rest_unchanged() {
        let doc = Document::from_text("a = b").with_selection(Selection::caret(1));
        let doc = press(doc, key(KeyCode::Enter), AlignmentMode::Off);
        assert_eq!(doc.text(), "a \\\\\n = b");
        assert_eq!(doc.selection(), Selection::caret(5));
    }
}
