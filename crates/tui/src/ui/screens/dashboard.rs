use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::AppState,
    ui::{
        components::{
            calendar,
            card::StatCard,
            money::{format_money, styled_profit},
        },
        screens::render_loading,
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let dashboard = &state.dashboard;
    if dashboard.loading {
        render_loading(frame, area, theme);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Min(10),
        ])
        .split(area);

    let stats = dashboard.model.stats();
    let name = state
        .session
        .principal
        .as_ref()
        .map(|principal| principal.display_name())
        .unwrap_or_default();
    let bookings = match stats.monthly_bookings {
        1 => "1 booking".to_string(),
        n => format!("{n} bookings"),
    };
    let welcome = vec![
        Line::from(Span::styled(
            format!("Welcome back, {name}"),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::styled(
            format!("You have {bookings} this month."),
            Style::default().fg(theme.dim),
        ),
    ];
    frame.render_widget(Paragraph::new(welcome), rows[0]);

    let month = stats.month.to_string();
    render_totals(frame, rows[1], &stats.monthly, &month, theme);
    render_totals(frame, rows[2], &stats.all_time, "All time", theme);

    let grid = dashboard
        .calendar
        .grid(dashboard.model.reservations(), state.today);
    calendar::render(frame, rows[3], &grid, theme);
}

fn render_totals(
    frame: &mut Frame<'_>,
    area: Rect,
    totals: &engine::Totals,
    period: &str,
    theme: &Theme,
) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    StatCard::new(
        "Revenue",
        Span::styled(
            format_money(totals.revenue),
            Style::default().fg(theme.positive).add_modifier(Modifier::BOLD),
        ),
        theme,
    )
    .subtitle(period)
    .render(frame, cols[0]);

    StatCard::new(
        "Expenses",
        Span::styled(
            format_money(totals.expenses),
            Style::default().fg(theme.negative).add_modifier(Modifier::BOLD),
        ),
        theme,
    )
    .subtitle(period)
    .render(frame, cols[1]);

    StatCard::new("Profit", styled_profit(totals.profit, theme), theme)
        .subtitle(period)
        .render(frame, cols[2]);
}
