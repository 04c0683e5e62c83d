use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::ui::{
    components::{centered_box, tabs::hints},
    theme::Theme,
};

/// Yes/no dialog for a pending delete.
pub fn render(frame: &mut Frame<'_>, area: Rect, prompt: Option<&str>, theme: &Theme) {
    let Some(prompt) = prompt else {
        return;
    };
    let width = (prompt.chars().count() as u16 + 6).max(30);
    let rect = centered_box(width, 5, area);

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.negative));
    let content = Paragraph::new(vec![
        Line::styled(prompt.to_string(), Style::default().fg(theme.text)),
        hints(&[("y", "delete"), ("n", "keep")], theme),
    ])
    .alignment(Alignment::Center)
    .block(block);

    frame.render_widget(Clear, rect);
    frame.render_widget(content, rect);
}
