use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Message, Model};
use crate::editor::{self, Direction, Intercept};
use crate::export::ExportFormat;

impl App {
    pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(key, model),
            Event::Resize(width, height) => Some(Message::Resize(*width, *height)),
            Event::Paste(text) => Some(Message::Edit(editor::Edit::with_caret_offset(
                model.document.selection().to_range(),
                text.clone(),
                text.chars().count(),
            ))),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: &KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        if ctrl && matches!(key.code, KeyCode::Char('q' | 'c')) {
            return Some(Message::Quit);
        }

        if model.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => Some(Message::HideHelp),
                KeyCode::Up | KeyCode::Char('k') => Some(Message::HelpScrollUp),
                KeyCode::Down | KeyCode::Char('j') => Some(Message::HelpScrollDown),
                _ => None,
            };
        }

        if model.palette.is_some() {
            return match key.code {
                KeyCode::Esc => Some(Message::ClosePalette),
                KeyCode::Up => Some(Message::PaletteUp),
                KeyCode::Down => Some(Message::PaletteDown),
                KeyCode::Tab => Some(Message::NextCategory),
                KeyCode::Enter => Some(Message::PaletteSelect),
                _ => None,
            };
        }

        match key.code {
            KeyCode::F(1) => return Some(Message::ToggleHelp),
            KeyCode::F(2) => return Some(Message::NextCategory),
            KeyCode::F(3) => return Some(Message::ToggleAlignment),
            KeyCode::F(5) => return Some(Message::Export(ExportFormat::Png)),
            KeyCode::F(6) => return Some(Message::Export(ExportFormat::Svg)),
            KeyCode::Char('p') if ctrl => return Some(Message::OpenPalette),
            KeyCode::Char(digit @ '1'..='9') if alt => {
                let idx = digit as usize - '1' as usize;
                return Some(Message::InsertSnippet(idx));
            }
            _ => {}
        }

        if let Some(action) = editor::intercept(&model.document, key, model.alignment) {
            return Some(match action {
                Intercept::Edit(edit) => Message::Edit(edit),
                Intercept::ToggleAlignment => Message::ToggleAlignment,
            });
        }

        match key.code {
            KeyCode::Char('a') if ctrl => Some(Message::SelectAll),
            KeyCode::Char(ch) if !ctrl && !alt => Some(Message::InsertChar(ch)),
            KeyCode::Enter => Some(Message::InsertNewline),
            KeyCode::Tab => Some(Message::InsertChar('\t')),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Left if ctrl => Some(Message::MoveWordLeft(shift)),
            KeyCode::Right if ctrl => Some(Message::MoveWordRight(shift)),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left, shift)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right, shift)),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up, shift)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down, shift)),
            KeyCode::Home if ctrl => Some(Message::MoveToStart(shift)),
            KeyCode::End if ctrl => Some(Message::MoveToEnd(shift)),
            KeyCode::Home => Some(Message::MoveHome(shift)),
            KeyCode::End => Some(Message::MoveEnd(shift)),
            _ => None,
        }
    }
}
