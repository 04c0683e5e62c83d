use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::ui::theme::Theme;

/// `$1,234.50`, with a leading minus for negative amounts.
pub fn format_money(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Money span colored by sign: profit green, loss red.
#[must_use]
pub fn styled_profit(amount: f64, theme: &Theme) -> Span<'static> {
    let color = if amount > 0.0 {
        theme.positive
    } else if amount < 0.0 {
        theme.negative
    } else {
        theme.text
    };

    Span::styled(
        format_money(amount),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_two_decimals_with_grouping() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(300.0), "$300.00");
        assert_eq!(format_money(1250.5), "$1,250.50");
        assert_eq!(format_money(1_000_000.0), "$1,000,000.00");
    }

    #[test]
    fn negative_and_odd_amounts() {
        assert_eq!(format_money(-50.0), "-$50.00");
        assert_eq!(format_money(-0.001), "$0.00");
        assert_eq!(format_money(f64::NAN), "$0.00");
        assert_eq!(format_money(0.125), "$0.13");
    }
}
