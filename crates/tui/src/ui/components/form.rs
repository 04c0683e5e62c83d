use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

use crate::ui::{
    components::{card, centered_box},
    theme::Theme,
};

/// One labelled row of a modal form.
pub struct FormRow<'a> {
    pub label: &'static str,
    pub value: &'a str,
    pub focused: bool,
    /// Cycled with the arrow keys instead of typed.
    pub choice: bool,
}

const LABEL_WIDTH: usize = 13;

/// Modal form centered over `area`, with an inline error line.
pub fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    rows: &[FormRow<'_>],
    error: Option<&str>,
    theme: &Theme,
) {
    let height = rows.len() as u16 + 4;
    let rect = centered_box(60, height, area);
    let block = card::block(title, theme, true);
    let inner = block.inner(rect);

    let mut lines: Vec<Line<'_>> = rows
        .iter()
        .map(|row| {
            let label_style = if row.focused {
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.dim)
            };
            let value = match (row.choice, row.focused) {
                (true, true) => format!("‹ {} ›", row.value),
                (true, false) => row.value.to_string(),
                (false, true) => format!("{}│", row.value),
                (false, false) => row.value.to_string(),
            };
            Line::from(vec![
                Span::styled(format!("{:<width$}", row.label, width = LABEL_WIDTH), label_style),
                Span::styled(value, Style::default().fg(theme.text)),
            ])
        })
        .collect();

    lines.push(Line::raw(""));
    if let Some(error) = error {
        lines.push(Line::styled(error.to_string(), Style::default().fg(theme.error)));
    }

    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);
    frame.render_widget(Paragraph::new(lines), inner);
}
