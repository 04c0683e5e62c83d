use engine::Route;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::ui::theme::Theme;

fn shortcut(route: Route) -> &'static str {
    match route {
        Route::Dashboard => "d",
        Route::Reservations => "r",
        Route::Expenses => "e",
        Route::Login => "",
    }
}

/// Navigation bar: the protected views plus sign-out.
pub fn render_nav(frame: &mut Frame<'_>, area: Rect, active: Route, theme: &Theme) {
    let mut spans = vec![
        Span::styled(
            " Villa Manager ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    for route in Route::NAV {
        spans.push(Span::styled(
            shortcut(route),
            Style::default().fg(theme.accent),
        ));
        spans.push(Span::raw(" "));
        let label = route.label();
        if route == active {
            spans.push(Span::styled(
                format!("[{label}]"),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(label, Style::default().fg(theme.dim)));
        }
        spans.push(Span::raw("   "));
    }

    spans.push(Span::styled("o", Style::default().fg(theme.accent)));
    spans.push(Span::raw(" Sign Out"));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Key hints rendered as `key action` pairs.
pub fn hints(pairs: &[(&'static str, &'static str)], theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, action)) in pairs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(*key, Style::default().fg(theme.accent)));
        spans.push(Span::styled(
            format!(" {action}"),
            Style::default().fg(theme.dim),
        ));
    }
    Line::from(spans)
}
