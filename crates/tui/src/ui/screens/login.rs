use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

use crate::{
    app::AppState,
    forms::{LoginField, LoginMode},
    ui::{
        components::{card, centered_box, tabs::hints},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let login = &state.login;
    let fields = login.fields();

    // Two lines per field plus the button row and padding.
    let box_height = fields.len() as u16 * 2 + 5;
    let card_area = centered_box(44, box_height, area);
    frame.render_widget(Clear, card_area);

    let title = match login.mode {
        LoginMode::SignIn => "Sign In",
        LoginMode::SignUp => "Create Account",
    };
    let block = card::block(title, theme, true);
    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let mut constraints: Vec<Constraint> = fields
        .iter()
        .flat_map(|_| [Constraint::Length(1), Constraint::Length(1)])
        .collect();
    constraints.push(Constraint::Length(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(inner);

    for (i, field) in fields.iter().enumerate() {
        let (label, value, secret) = match field {
            LoginField::FullName => ("Full name", login.full_name.as_str(), false),
            LoginField::Email => ("Email", login.email.as_str(), false),
            LoginField::Password => ("Password", login.password.as_str(), true),
        };
        render_input(
            frame,
            rows[i * 2],
            label,
            value,
            secret,
            login.focus == *field,
            theme,
        );
    }

    let button = match (login.busy, login.mode) {
        (true, _) => "Loading...",
        (false, LoginMode::SignIn) => "[ Enter: Sign In ]",
        (false, LoginMode::SignUp) => "[ Enter: Sign Up ]",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(button, Style::default().fg(theme.accent)))
            .alignment(Alignment::Center),
        rows[fields.len() * 2],
    );

    // Messages and hints below the box.
    let below = Rect {
        x: card_area.x.saturating_sub(8),
        y: card_area.y.saturating_add(card_area.height).saturating_add(1),
        width: card_area.width.saturating_add(16).min(area.width),
        height: 3,
    }
    .intersection(area);

    let toggle = match login.mode {
        LoginMode::SignIn => "need an account? sign up",
        LoginMode::SignUp => "have an account? sign in",
    };
    let mut lines = vec![hints(
        &[("Tab", "next field"), ("Ctrl+S", toggle), ("Esc", "quit")],
        theme,
    )];
    if let Some(error) = &login.error {
        lines.push(Line::styled(error.clone(), Style::default().fg(theme.error)));
    }
    if let Some(info) = &login.info {
        lines.push(Line::styled(info.clone(), Style::default().fg(theme.positive)));
    }
    if state.demo {
        lines.push(Line::styled(
            format!(
                "demo account: {} / {}",
                crate::demo::DEMO_EMAIL,
                crate::demo::DEMO_PASSWORD
            ),
            Style::default().fg(theme.dim),
        ));
    }

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), below);
}

fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    secret: bool,
    focused: bool,
    theme: &Theme,
) {
    let cursor = if focused { "│" } else { "" };
    let shown = if secret {
        mask_password(value)
    } else {
        value.to_string()
    };

    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.dim)
    };

    let line = Line::from(vec![
        Span::styled(format!("{label:<10}"), style),
        Span::styled(format!("{shown}{cursor}"), Style::default().fg(theme.text)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// One bullet per character.
fn mask_password(password: &str) -> String {
    "•".repeat(password.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_mask_counts_characters() {
        assert_eq!(mask_password(""), "");
        assert_eq!(mask_password("pässwörd"), "••••••••");
    }
}
