use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use eqpad::editor::{
    AlignDomain, AlignmentMode, Direction, Document, Edit, Intercept, Selection, disable, enable,
    insert, intercept,
};
use eqpad::render::{FormulaSummary, RenderOptions, UnicodePreview, render_source};
use eqpad::snippets::{Category, SnippetCatalog};

/// Apply an edit the way the host does: commit, draw, then place the caret.
fn commit(mut doc: Document, edit: &Edit) -> Document {
    let pending = doc.apply_edit(edit).unwrap();
    doc.place_caret(pending);
    doc
}

fn press(doc: Document, code: KeyCode, modifiers: KeyModifiers, mode: AlignmentMode) -> Document {
    match intercept(&doc, &KeyEvent::new(code, modifiers), mode) {
        Some(Intercept::Edit(edit)) => commit(doc, &edit),
        Some(Intercept::ToggleAlignment) => panic!("unexpected toggle"),
        None => {
            let mut doc = doc;
            match code {
                KeyCode::Char(ch) => doc.insert_char(ch),
                KeyCode::Enter => doc.insert_char('\n'),
                _ => {}
            }
            doc
        }
    }
}

fn type_str(mut doc: Document, text: &str) -> Document {
    for ch in text.chars() {
        doc = press(doc, KeyCode::Char(ch), KeyModifiers::NONE, AlignmentMode::Off);
    }
    doc
}

fn at_end(text: &str) -> Document {
    let doc = Document::from_text(text);
    let end = doc.len_chars();
    doc.with_selection(Selection::caret(end))
}

#[test]
fn test_seed_scenario() {
    let seed = "f(x) = \\frac{-b \\pm \\sqrt{b^2-4ac}}{2a}";
    let doc = type_str(at_end(seed), " b2");
    assert_eq!(doc.text(), format!("{seed} b2"));

    let doc = press(doc, KeyCode::Enter, KeyModifiers::NONE, AlignmentMode::Off);
    assert_eq!(doc.text(), format!("{seed} b2 \\\\\n"));
    assert_eq!(doc.selection(), Selection::caret(doc.len_chars()));
}

#[test]
fn test_each_open_bracket_pairs_with_caret_inside() {
    for (open, close) in [('(', ')'), ('[', ']'), ('{', '}')] {
        let doc = type_str(at_end("x"), &open.to_string());
        assert_eq!(doc.text(), format!("x{open}{close}"));
        assert_eq!(doc.selection(), Selection::caret(2));
    }
}

#[test]
fn test_typing_a_fraction_with_nested_groups() {
    let mut doc = type_str(at_end(""), "y = (a+b");
    assert_eq!(doc.text(), "y = (a+b)");
    // Step over the auto-inserted close.
    doc.move_cursor(Direction::Right, false);
    let doc = type_str(doc, "/2");
    assert_eq!(doc.text(), "y = \\frac{(a+b)}{2}");
}

#[test]
fn test_scaling_space_is_applied_once() {
    let doc = type_str(at_end(""), "(\\frac12");
    let mut doc = doc;
    doc.move_to_end(false);
    let doc = type_str(doc, " ");
    assert_eq!(doc.text(), "\\left(\\frac12\\right)");

    // The caret follows the scaled pair; another space is plain text.
    let doc = type_str(doc, " ");
    assert_eq!(doc.text(), "\\left(\\frac12\\right) ");
}

#[test]
fn test_snippet_wraps_selection_then_offers_second_placeholder() {
    let catalog = SnippetCatalog::builtin();
    let fraction = catalog.get(Category::Math, 0).unwrap();
    assert_eq!(fraction.insert_text, "\\frac{a}{b}");

    let doc = Document::from_text("x + y").with_selection(Selection::range(4, 5));
    let edit = insert(&doc, fraction);
    let doc = commit(doc, &edit);
    assert_eq!(doc.text(), "x + \\frac{y}{b}");
    assert_eq!(doc.selected_text(), "b");

    // Typing replaces the offered placeholder.
    let mut doc = doc;
    doc.insert_char('2');
    assert_eq!(doc.text(), "x + \\frac{y}{2}");
}

#[test]
fn test_alignment_round_trip_normalizes_spacing() {
    let doc = Document::from_text("a=b\nc = d");
    let edit = enable(&doc, AlignDomain::Math);
    let enabled = commit(doc, &edit);
    assert_eq!(
        enabled.text(),
        "\\begin{aligned}\na &= b\\\\\nc &= d\n\\end{aligned}"
    );
    let edit = disable(&enabled);
    let disabled = commit(enabled, &edit);
    assert_eq!(disabled.text(), "a = b\nc = d");
}

#[test]
fn test_enter_in_aligned_mode_is_native() {
    let doc = press(at_end("a &= b"), KeyCode::Enter, KeyModifiers::NONE, AlignmentMode::On);
    assert_eq!(doc.text(), "a &= b\n");
}

#[test]
fn test_preview_of_typed_chemistry() {
    // The closing brace comes from auto-pairing.
    let doc = type_str(at_end(""), "\\ce{2H2 + O2 -> 2H2O");
    assert_eq!(doc.text(), "\\ce{2H2 + O2 -> 2H2O}");
    let tree = render_source(
        &UnicodePreview,
        &FormulaSummary,
        &doc.text(),
        &RenderOptions::default(),
    )
    .unwrap();
    assert_eq!(tree.lines()[0].text, "2H₂ + O₂ → 2H₂O");
}
