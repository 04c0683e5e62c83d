use engine::ReservationStatus;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Cell, Paragraph, Row, Table},
};

use crate::{
    app::AppState,
    forms::{DATE_FORMAT, ReservationField},
    ui::{
        components::{
            card,
            form::{self, FormRow},
            money::format_money,
        },
        screens::render_loading,
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let view = &state.reservations;
    if view.loading {
        render_loading(frame, area, theme);
        return;
    }

    let block = card::block("Reservations", theme, view.form.is_none());
    if view.items.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No reservations yet. Press a to add one.",
                Style::default().fg(theme.dim),
            ))
            .block(block),
            area,
        );
    } else {
        let header = Row::new(["Guest", "Check-in", "Check-out", "Price", "Status", "Notes"])
            .style(Style::default().fg(theme.dim).add_modifier(Modifier::BOLD));

        let rows = view.items.iter().enumerate().map(|(i, reservation)| {
            let style = if i == view.selected {
                Style::default().fg(theme.accent).add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(theme.text)
            };
            Row::new(vec![
                Cell::from(reservation.guest_name.clone()),
                Cell::from(reservation.check_in.format(DATE_FORMAT).to_string()),
                Cell::from(reservation.check_out.format(DATE_FORMAT).to_string()),
                Cell::from(format_money(reservation.total_price)),
                Cell::from(Span::styled(
                    reservation.status.label(),
                    status_style(reservation.status, theme),
                )),
                Cell::from(reservation.notes.clone().unwrap_or_default()),
            ])
            .style(style)
        });

        let table = Table::new(
            rows,
            [
                Constraint::Min(16),
                Constraint::Length(11),
                Constraint::Length(11),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .column_spacing(2)
        .block(block);
        frame.render_widget(table, area);
    }

    if let Some(edit) = &view.form {
        let rows: Vec<FormRow<'_>> = ReservationField::ALL
            .iter()
            .map(|&field| FormRow {
                label: field.label(),
                value: edit.value(field),
                focused: edit.focus == field,
                choice: field == ReservationField::Status,
            })
            .collect();
        form::render(frame, area, edit.title(), &rows, edit.error.as_deref(), theme);
    }
}

fn status_style(status: ReservationStatus, theme: &Theme) -> Style {
    match status {
        ReservationStatus::Confirmed => Style::default().fg(theme.positive),
        ReservationStatus::Reserved => Style::default().fg(theme.accent),
        ReservationStatus::Cancelled | ReservationStatus::Completed => {
            Style::default().fg(theme.dim)
        }
    }
}
