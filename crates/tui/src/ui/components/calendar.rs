use engine::{CalendarGrid, DayStatus, WEEKDAY_LABELS};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::ui::{components::card, theme::Theme};

const CELL_WIDTH: usize = 5;

fn cell(label: impl std::fmt::Display) -> String {
    format!("{label:^width$}", width = CELL_WIDTH)
}

/// Month grid with reserved days filled and today underlined.
pub fn render(frame: &mut Frame<'_>, area: Rect, grid: &CalendarGrid, theme: &Theme) {
    let title = grid.month.to_string();
    let block = card::block(&title, theme, false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from(vec![
        Span::styled("‹ p", Style::default().fg(theme.accent)),
        Span::raw(format!("{:^width$}", "", width = CELL_WIDTH * 7 - 6)),
        Span::styled("n ›", Style::default().fg(theme.accent)),
    ])];

    lines.push(Line::from(
        WEEKDAY_LABELS
            .iter()
            .map(|label| Span::styled(cell(label), Style::default().fg(theme.dim)))
            .collect::<Vec<_>>(),
    ));

    for week in &grid.weeks {
        let spans: Vec<Span<'static>> = week
            .iter()
            .map(|day| {
                let mut style = Style::default().fg(theme.text);
                if !day.in_month {
                    style = style.fg(theme.dim).add_modifier(Modifier::DIM);
                }
                if day.status == DayStatus::Reserved {
                    style = style.bg(theme.reserved);
                }
                if day.is_today {
                    style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                }
                Span::styled(cell(chrono::Datelike::day(&day.date)), style)
            })
            .collect();
        lines.push(Line::from(spans));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("     ", Style::default().bg(theme.reserved)),
        Span::styled(" Reserved   ", Style::default().fg(theme.dim)),
        Span::styled(
            "today",
            Style::default()
                .fg(theme.text)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ),
        Span::styled(" Today", Style::default().fg(theme.dim)),
    ]));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_fixed_width() {
        assert_eq!(cell(1), "  1  ");
        assert_eq!(cell(28), " 28  ");
        assert_eq!(cell("Sun"), " Sun ");
    }
}
