pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use engine::{Guard, Route};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::Paragraph,
};

use crate::app::{AppState, PendingDelete};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();

    match state.guard() {
        Guard::Loading | Guard::Redirect(_) => screens::render_loading(frame, area, &theme),
        Guard::Render(Route::Login) => screens::login::render(frame, area, state, &theme),
        Guard::Render(route) => render_shell(frame, area, route, state, &theme),
    }

    components::toast::render_notice(frame, area, state.notice.as_deref(), &theme);
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, route: Route, state: &AppState, theme: &Theme) {
    let [nav, content, bottom] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

    components::tabs::render_nav(frame, nav, route, theme);

    match route {
        Route::Dashboard => screens::dashboard::render(frame, content, state, theme),
        Route::Reservations => screens::reservations::render(frame, content, state, theme),
        Route::Expenses => screens::expenses::render(frame, content, state, theme),
        Route::Login => {}
    }

    render_bottom_bar(frame, bottom, route, state, theme);
    components::confirm::render(
        frame,
        area,
        state.confirm.as_ref().map(PendingDelete::prompt),
        theme,
    );
    components::toast::render_busy(frame, bottom, state.busy, theme);
}

fn bottom_hints(route: Route, state: &AppState) -> &'static [(&'static str, &'static str)] {
    let editing = match route {
        Route::Reservations => state.reservations.form.is_some(),
        Route::Expenses => state.expenses.form.is_some(),
        Route::Dashboard | Route::Login => false,
    };
    if editing {
        return &[
            ("Tab", "next"),
            ("S-Tab", "prev"),
            ("←/→", "choose"),
            ("Enter", "save"),
            ("Esc", "cancel"),
        ];
    }

    match route {
        Route::Dashboard => &[("n/p", "month"), ("q", "quit")],
        Route::Reservations => &[
            ("j/k", "move"),
            ("a", "add"),
            ("Enter", "edit"),
            ("x", "delete"),
            ("q", "quit"),
        ],
        Route::Expenses => &[("j/k", "move"), ("a", "add"), ("x", "delete"), ("q", "quit")],
        Route::Login => &[],
    }
}

fn render_bottom_bar(
    frame: &mut Frame<'_>,
    area: Rect,
    route: Route,
    state: &AppState,
    theme: &Theme,
) {
    let mut line = components::tabs::hints(bottom_hints(route, state), theme);
    if state.demo {
        line.spans.push(Span::styled(
            "   demo data, nothing is saved",
            Style::default().fg(theme.dim),
        ));
    }
    frame.render_widget(Paragraph::new(line), area);
}
