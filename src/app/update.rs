use crate::app::Model;
use crate::app::model::ToastLevel;
use crate::editor::{self, Direction, Edit};
use crate::export::ExportFormat;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Assisted editing
    /// Commit an edit produced by the interceptor or a snippet
    Edit(Edit),
    /// Wrap or unwrap the buffer in an aligned block
    ToggleAlignment,
    /// Place a caret left pending by the previous edit
    CommitCaret,

    // Native editing
    InsertChar(char),
    InsertNewline,
    DeleteBack,
    DeleteForward,
    /// Move the caret; `true` extends the selection
    MoveCursor(Direction, bool),
    MoveHome(bool),
    MoveEnd(bool),
    MoveWordLeft(bool),
    MoveWordRight(bool),
    MoveToStart(bool),
    MoveToEnd(bool),
    SelectAll,

    // Snippets
    /// Insert the n-th snippet of the active category
    InsertSnippet(usize),
    NextCategory,
    OpenPalette,
    ClosePalette,
    PaletteUp,
    PaletteDown,
    PaletteSelect,

    // Export
    Export(ExportFormat),

    // Help
    ToggleHelp,
    HideHelp,
    HelpScrollUp,
    HelpScrollDown,

    // Window
    Resize(u16, u16),
    Quit,
}

/// Pure function that applies a message to the model.
///
/// A caret still pending from the previous message is placed first so a
/// fast typist never skips one.
pub fn update(mut model: Model, msg: Message) -> Model {
    model.commit_pending_caret();

    match msg {
        Message::Edit(edit) => {
            apply_edit(&mut model, &edit);
        }
        Message::ToggleAlignment => {
            let (edit, mode) =
                editor::toggle(&model.document, model.align_domain(), model.alignment);
            tracing::debug!(?mode, domain = ?model.align_domain(), "toggle alignment");
            if apply_edit(&mut model, &edit) {
                model.alignment = mode;
                let label = if mode.is_on() { "on" } else { "off" };
                model.show_toast(ToastLevel::Info, format!("Alignment {label}"));
            }
        }
        Message::CommitCaret => {}

        Message::InsertChar(ch) => {
            model.document.insert_char(ch);
            ensure_caret_visible(&mut model);
        }
        Message::InsertNewline => {
            model.document.insert_char('\n');
            ensure_caret_visible(&mut model);
        }
        Message::DeleteBack => {
            model.document.delete_back();
            ensure_caret_visible(&mut model);
        }
        Message::DeleteForward => {
            model.document.delete_forward();
        }
        Message::MoveCursor(dir, extend) => {
            model.document.move_cursor(dir, extend);
            ensure_caret_visible(&mut model);
        }
        Message::MoveHome(extend) => model.document.move_home(extend),
        Message::MoveEnd(extend) => model.document.move_end(extend),
        Message::MoveWordLeft(extend) => {
            model.document.move_word_left(extend);
            ensure_caret_visible(&mut model);
        }
        Message::MoveWordRight(extend) => {
            model.document.move_word_right(extend);
            ensure_caret_visible(&mut model);
        }
        Message::MoveToStart(extend) => {
            model.document.move_to_start(extend);
            ensure_caret_visible(&mut model);
        }
        Message::MoveToEnd(extend) => {
            model.document.move_to_end(extend);
            ensure_caret_visible(&mut model);
        }
        Message::SelectAll => model.document.select_all(),

        Message::InsertSnippet(idx) => insert_snippet(&mut model, idx),
        Message::NextCategory => {
            model.category = model.category.next();
            if let Some(selected) = &mut model.palette {
                *selected = 0;
            }
        }
        Message::OpenPalette => {
            model.help_visible = false;
            model.palette = Some(0);
        }
        Message::ClosePalette => model.palette = None,
        Message::PaletteUp => {
            if let Some(selected) = &mut model.palette {
                *selected = selected.saturating_sub(1);
            }
        }
        Message::PaletteDown => {
            let last = model.active_snippets().len().saturating_sub(1);
            if let Some(selected) = &mut model.palette {
                *selected = (*selected + 1).min(last);
            }
        }
        Message::PaletteSelect => {
            if let Some(idx) = model.palette.take() {
                insert_snippet(&mut model, idx);
            }
        }

        // Export writes files; see `handle_message_side_effects`.
        Message::Export(_) => {}

        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
            model.help_scroll = 0;
            if model.help_visible {
                model.palette = None;
            }
        }
        Message::HideHelp => model.help_visible = false,
        Message::HelpScrollUp => model.help_scroll = model.help_scroll.saturating_sub(1),
        Message::HelpScrollDown => model.help_scroll = model.help_scroll.saturating_add(1),

        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            ensure_caret_visible(&mut model);
        }
        Message::Quit => model.should_quit = true,
    }

    model
}

/// Commit `edit` and remember its caret request. Returns `false` when the
/// edit was rejected and the document left untouched.
fn apply_edit(model: &mut Model, edit: &Edit) -> bool {
    match model.document.apply_edit(edit) {
        Ok(pending) => {
            model.set_pending_caret(pending);
            ensure_caret_visible(model);
            true
        }
        Err(err) => {
            tracing::warn!(%err, "edit rejected");
            model.show_toast(ToastLevel::Warning, err.to_string());
            false
        }
    }
}

fn insert_snippet(model: &mut Model, idx: usize) {
    let Some(snippet) = model.catalog.get(model.category, idx) else {
        return;
    };
    let edit = editor::insert(&model.document, snippet);
    tracing::debug!(id = %snippet.id, "insert snippet");
    apply_edit(model, &edit);
}

/// Scroll the editor pane so the caret line stays on screen.
pub(super) fn ensure_caret_visible(model: &mut Model) {
    let (caret_line, _) = model.document.caret_line_col();
    let visible_height = model.editor_height();
    if visible_height == 0 {
        model.editor_scroll_offset = caret_line;
        return;
    }

    if caret_line < model.editor_scroll_offset {
        model.editor_scroll_offset = caret_line;
    } else if caret_line >= model.editor_scroll_offset + visible_height {
        model.editor_scroll_offset = caret_line + 1 - visible_height;
    }
}
