use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};

/// Alt+n shortcuts for the first nine snippets of the active category.
pub fn render_snippet_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Yellow);
    let mut spans = vec![Span::raw(" ")];
    for (i, snippet) in model.active_snippets().iter().take(9).enumerate() {
        spans.push(Span::styled(format!("M-{}", i + 1), key_style));
        spans.push(Span::raw(format!(" {}  ", snippet.label)));
    }
    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(bar, area);
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let (line, col) = model.document.caret_line_col();
    let align_indicator = if model.alignment.is_on() {
        " [aligned]"
    } else {
        ""
    };
    let trust_indicator = if model.render_options.trust {
        ""
    } else {
        " [untrusted]"
    };

    let status = format!(
        " {}  Ln {}, Col {}{}{}  F1:help  ^P:snippets  F2:category  F3:align  F5/F6:export  ^Q:quit",
        model.category.label(),
        line + 1,
        col + 1,
        align_indicator,
        trust_indicator
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
