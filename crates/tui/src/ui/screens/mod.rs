pub mod dashboard;
pub mod expenses;
pub mod login;
pub mod reservations;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    widgets::Paragraph,
};

use crate::ui::{components::centered_box, theme::Theme};

/// Placeholder shown while a view waits for its data or the session.
pub fn render_loading(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let rect = centered_box(20, 1, area);
    frame.render_widget(
        Paragraph::new("Loading...")
            .style(Style::default().fg(theme.dim))
            .alignment(Alignment::Center),
        rect,
    );
}
