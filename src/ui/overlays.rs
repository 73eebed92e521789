use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;

/// Popup area of the snippet palette: two rows per snippet.
pub fn palette_rect(area: Rect, items_len: usize) -> Rect {
    let rows = u16::try_from(items_len.saturating_mul(2)).unwrap_or(u16::MAX);
    let popup_width = area.width.saturating_sub(8).clamp(40, 80);
    let popup_height = rows.saturating_add(4);
    centered_popup_rect(popup_width, popup_height, area)
}

pub fn render_palette_overlay(model: &Model, selected: usize, frame: &mut Frame, area: Rect) {
    let snippets = model.active_snippets();
    let popup = palette_rect(area, snippets.len());
    let dim_style = Style::default().fg(Color::Indexed(245));

    // Border(1) + padding(1) top and bottom.
    let visible = usize::from(popup.height.saturating_sub(4) / 2).max(1);
    let first = selected.saturating_sub(visible - 1);

    let mut lines: Vec<Line> = Vec::new();
    for (i, snippet) in snippets.iter().enumerate().skip(first).take(visible) {
        let marker = if i == selected { ">" } else { " " };
        let label_style = if i == selected {
            Style::default().add_modifier(Modifier::BOLD).reversed()
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let shortcut = if i < 9 {
            format!("M-{} ", i + 1)
        } else {
            "    ".to_string()
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{marker} ")),
            Span::styled(shortcut, Style::default().fg(Color::Yellow)),
            Span::styled(snippet.label.clone(), label_style),
            Span::styled(format!("  {}", snippet.insert_text), dim_style),
        ]));
        lines.push(Line::styled(format!("        {}", snippet.description), dim_style));
    }

    let block = Block::default()
        .title(format!(
            "Snippets: {} (Tab: next, Enter: insert, Esc: close)",
            model.category.label()
        ))
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(6).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let mut all_lines: Vec<Line> = Vec::new();

    all_lines.push(Line::styled("Assisted typing", section_style));
    all_lines.push(Line::raw("  ( [ {               Insert the closing bracket too"));
    all_lines.push(Line::raw("  ^                   Superscript group ^{}"));
    all_lines.push(Line::raw("  /                   Fraction from the preceding term"));
    all_lines.push(Line::raw("  Space after ) ] }   Scale \\sum, \\int, \\frac groups"));
    all_lines.push(Line::raw("  Enter               New line with \\\\ continuation"));
    all_lines.push(Line::raw("  Alt+Enter           Plain new line"));
    all_lines.push(Line::raw("  Ctrl+Enter / F3     Toggle aligned block"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Snippets", section_style));
    all_lines.push(Line::raw("  Ctrl+P              Snippet palette"));
    all_lines.push(Line::raw("  Alt+1..9            Insert snippet n"));
    all_lines.push(Line::raw("  F2                  Next category"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Editor", section_style));
    all_lines.push(Line::raw("  Arrows, Home/End    Navigate"));
    all_lines.push(Line::raw("  Shift+movement      Extend selection"));
    all_lines.push(Line::raw("  Ctrl+Left/Right     Word movement"));
    all_lines.push(Line::raw("  Ctrl+Home/End       Buffer start / end"));
    all_lines.push(Line::raw("  Ctrl+A              Select all"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Other", section_style));
    all_lines.push(Line::raw(format!(
        "  F5 / F6             Export PNG / SVG to {}",
        model.export_dir.display()
    )));
    all_lines.push(Line::raw("  Ctrl-q / Ctrl-c     Quit"));
    all_lines.push(Line::raw("  F1                  Toggle help"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Config", section_style));
    all_lines.push(Line::raw(format!("  Global: {global_cfg}")));
    all_lines.push(Line::raw(format!("  Local override: {local_cfg}")));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Inner area: border(1) + padding(1) on each side = 4
    let inner = Rect::new(
        popup.x + 2,
        popup.y + 2,
        popup.width.saturating_sub(4),
        popup.height.saturating_sub(4),
    );

    // Reserve 1 row at bottom for footer hint
    let content_height_u16 = inner.height.saturating_sub(1);
    let content_height = content_height_u16 as usize;
    let max_scroll = all_lines.len().saturating_sub(content_height);
    let scroll = model.help_scroll.min(max_scroll);

    let end = (scroll + content_height).min(all_lines.len());
    let visible: Vec<Line> = all_lines[scroll..end].to_vec();

    let content_area = Rect::new(inner.x, inner.y, inner.width, content_height_u16);
    frame.render_widget(Paragraph::new(visible), content_area);

    let footer_area = Rect::new(inner.x, inner.y + content_height_u16, inner.width, 1);
    let footer = Line::styled("j/k scroll \u{2502} Esc closes", dim_style);
    frame.render_widget(Paragraph::new(footer), footer_area);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
