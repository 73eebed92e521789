use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::{Model, Preview};

use super::{EDITOR_HEIGHT_PERCENT, PREVIEW_HEIGHT_PERCENT, overlays, status};

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    pub editor: Rect,
    pub preview: Option<Rect>,
    pub snippets: Rect,
    pub status: Rect,
}

pub fn split_panes(area: Rect, preview: bool) -> PaneLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    let (editor, preview) = if preview {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(EDITOR_HEIGHT_PERCENT),
                Constraint::Percentage(PREVIEW_HEIGHT_PERCENT),
            ])
            .split(rows[0]);
        (body[0], Some(body[1]))
    } else {
        (rows[0], None)
    };
    PaneLayout {
        editor,
        preview,
        snippets: rows[1],
        status: rows[2],
    }
}

/// Text rows inside the editor pane's border.
pub fn editor_area_height(area: Rect, preview: bool) -> u16 {
    split_panes(area, preview).editor.height.saturating_sub(2)
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let layout = split_panes(area, model.preview_enabled);

    render_editor(model, frame, layout.editor);
    if let Some(preview_area) = layout.preview {
        render_preview(model, frame, preview_area);
    }
    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, layout.snippets);
    } else {
        status::render_snippet_bar(model, frame, layout.snippets);
    }
    status::render_status_bar(model, frame, layout.status);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    } else if let Some(selected) = model.palette {
        overlays::render_palette_overlay(model, selected, frame, area);
    }
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let doc = &model.document;
    let title = format!(
        " {} \u{2502} align {} ",
        model.category.label(),
        if model.alignment.is_on() { "on" } else { "off" }
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);

    let total_lines = doc.line_count();
    let gutter_width = line_number_width(total_lines);
    let text_width = usize::from(inner.width.saturating_sub(gutter_width + 1)).max(1);

    let selection = doc.selection();
    let selected = selection.to_range();
    let caret = selection.head;
    let (_, caret_col) = doc.line_col(caret);
    // Horizontal scroll so the caret column stays on screen.
    let h_offset = caret_col.saturating_sub(text_width - 1);

    let visible_height = usize::from(inner.height);
    let start = model.editor_scroll_offset;
    let end = (start + visible_height).min(total_lines);

    let selection_style = Style::default().bg(Color::Blue).fg(Color::White);
    let caret_style = Style::default().bg(Color::White).fg(Color::Black);

    let mut content: Vec<Line> = Vec::with_capacity(end.saturating_sub(start));
    for line_idx in start..end {
        let line_start = doc.rope().line_to_char(line_idx);
        let line_text = doc.line_at(line_idx).unwrap_or_default();
        let line_num = format!(
            "{:>width$} ",
            line_idx + 1,
            width = usize::from(gutter_width)
        );
        let mut spans = vec![Span::styled(line_num, Style::default().fg(Color::DarkGray))];

        let mut run = String::new();
        let mut run_style = Style::default();
        let chars: Vec<char> = line_text.chars().collect();
        // One extra cell past the end so a caret at end of line is visible.
        for col in h_offset..=chars.len() {
            let idx = line_start + col;
            let ch = chars.get(col).copied();
            let style = if idx == caret && selection.is_empty() {
                caret_style
            } else if selected.contains(&idx) && ch.is_some() {
                selection_style
            } else {
                Style::default()
            };
            let Some(ch) = ch.or_else(|| (style == caret_style).then_some(' ')) else {
                continue;
            };
            if style != run_style && !run.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut run), run_style));
            }
            run_style = style;
            run.push(if ch == '\t' { ' ' } else { ch });
        }
        if !run.is_empty() {
            spans.push(Span::styled(run, run_style));
        }
        content.push(Line::from(spans));
    }

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Preview ").borders(Borders::ALL);
    let body: Vec<Line> = match &model.preview {
        Preview::Lines(lines) => lines
            .iter()
            .flat_map(|line| {
                let padding = line.height.saturating_sub(1) as usize;
                std::iter::once(Line::raw(line.text.clone()))
                    .chain(std::iter::repeat_n(Line::raw(""), padding))
            })
            .collect(),
        Preview::Error(message) => vec![Line::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )],
        Preview::Disabled => Vec::new(),
    };
    frame.render_widget(
        Paragraph::new(body)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else {
        5
    }
}
