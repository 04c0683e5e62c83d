use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Cell, Paragraph, Row, Table},
};

use crate::{
    app::AppState,
    forms::{DATE_FORMAT, ExpenseField},
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
    let view = &state.expenses;
    if view.loading {
        render_loading(frame, area, theme);
        return;
    }

    let total: f64 = view.items.iter().map(|expense| expense.amount).sum();
    let title = format!("Expenses · {}", format_money(total));
    let block = card::block(&title, theme, view.form.is_none());

    if view.items.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No expenses recorded. Press a to add one.",
                Style::default().fg(theme.dim),
            ))
            .block(block),
            area,
        );
    } else {
        let header = Row::new(["Date", "Description", "Category", "Amount"])
            .style(Style::default().fg(theme.dim).add_modifier(Modifier::BOLD));

        let rows = view.items.iter().enumerate().map(|(i, expense)| {
            let style = if i == view.selected {
                Style::default().fg(theme.accent).add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(theme.text)
            };
            Row::new(vec![
                Cell::from(expense.date.format(DATE_FORMAT).to_string()),
                Cell::from(expense.description.clone()),
                Cell::from(expense.category.clone()),
                Cell::from(Span::styled(
                    format_money(expense.amount),
                    Style::default().fg(theme.negative),
                )),
            ])
            .style(style)
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(11),
                Constraint::Min(20),
                Constraint::Length(14),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .column_spacing(2)
        .block(block);
        frame.render_widget(table, area);
    }

    if let Some(edit) = &view.form {
        let rows: Vec<FormRow<'_>> = ExpenseField::ALL
            .iter()
            .map(|&field| FormRow {
                label: field.label(),
                value: edit.value(field),
                focused: edit.focus == field,
                choice: field == ExpenseField::Category,
            })
            .collect();
        form::render(frame, area, "New Expense", &rows, edit.error.as_deref(), theme);
    }
}
