use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::ui::{components::centered_box, theme::Theme};

/// Blocking error notice; any key dismisses it.
pub fn render_notice(frame: &mut Frame<'_>, area: Rect, message: Option<&str>, theme: &Theme) {
    let Some(message) = message else {
        return;
    };
    let width = (message.chars().count() as u16 + 4).clamp(30, 70);
    let rect = centered_box(width, 6, area);
    let style = Style::default().fg(theme.error);

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(style);
    let content = Paragraph::new(vec![
        Line::styled(message.to_string(), style),
        Line::raw(""),
        Line::styled("press any key", Style::default().fg(theme.dim)),
    ])
    .wrap(Wrap { trim: true })
    .block(block);

    frame.render_widget(Clear, rect);
    frame.render_widget(content, rect);
}

/// One-line progress message in the bottom-right corner.
pub fn render_busy(frame: &mut Frame<'_>, area: Rect, busy: Option<&str>, theme: &Theme) {
    let Some(busy) = busy else {
        return;
    };
    let width = (busy.chars().count() as u16 + 2).min(area.width);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width),
        y: area.y + area.height.saturating_sub(1),
        width,
        height: 1,
    };
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(Line::styled(busy.to_string(), Style::default().fg(theme.accent))),
        rect,
    );
}
