//! Occupancy calendar.
//!
//! A reservation occupies the nights from check-in up to, but excluding, the
//! check-out day: on the departure date the property is free again. Only
//! active reservations (confirmed or reserved) occupy days; overlapping stays
//! are not an error.

use api_types::reservation::Reservation;
use chrono::{Datelike, Days, NaiveDate};

use crate::month::YearMonth;

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayStatus {
    Reserved,
    Free,
}

/// Whether any active reservation covers `day`.
pub fn day_status(day: NaiveDate, reservations: &[Reservation]) -> DayStatus {
    let reserved = reservations.iter().any(|reservation| {
        reservation.status.is_active()
            && reservation.check_in <= day
            && day < reservation.check_out
    });

    if reserved {
        DayStatus::Reserved
    } else {
        DayStatus::Free
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// False for the leading/trailing days borrowed from adjacent months.
    pub in_month: bool,
    pub status: DayStatus,
    pub is_today: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarGrid {
    pub month: YearMonth,
    /// Sunday-first weeks, from the week holding the 1st through the week
    /// holding the last day of the month.
    pub weeks: Vec<[CalendarDay; 7]>,
}

pub fn grid(month: YearMonth, reservations: &[Reservation], today: NaiveDate) -> CalendarGrid {
    let first = month.first_day();
    let last = month.last_day();
    let lead = u64::from(first.weekday().num_days_from_sunday());
    let trail = 6 - u64::from(last.weekday().num_days_from_sunday());
    let start = first.checked_sub_days(Days::new(lead)).unwrap_or(first);
    let end = last.checked_add_days(Days::new(trail)).unwrap_or(last);

    let mut weeks = Vec::new();
    let mut week_start = start;
    while week_start <= end {
        let week: [CalendarDay; 7] = std::array::from_fn(|offset| {
            let date = week_start
                .checked_add_days(Days::new(offset as u64))
                .unwrap_or(week_start);
            CalendarDay {
                date,
                in_month: month.contains(date),
                status: day_status(date, reservations),
                is_today: date == today,
            }
        });
        weeks.push(week);

        match week_start.checked_add_days(Days::new(7)) {
            Some(next) => week_start = next,
            None => break,
        }
    }

    CalendarGrid { month, weeks }
}

/// Navigation state: the month currently on display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calendar {
    displayed: YearMonth,
}

impl Calendar {
    pub fn new(displayed: YearMonth) -> Self {
        Self { displayed }
    }

    pub fn displayed(&self) -> YearMonth {
        self.displayed
    }

    pub fn next(&mut self) {
        self.displayed = self.displayed.next();
    }

    pub fn previous(&mut self) {
        self.displayed = self.displayed.previous();
    }

    pub fn grid(&self, reservations: &[Reservation], today: NaiveDate) -> CalendarGrid {
        grid(self.displayed, reservations, today)
    }
}

#[cfg(test)]
mod tests {
    use api_types::reservation::ReservationStatus;
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stay(check_in: NaiveDate, check_out: NaiveDate, status: ReservationStatus) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            guest_name: "Guest".to_string(),
            check_in,
            check_out,
            total_price: 100.0,
            status,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn checkout_day_is_free() {
        let reservations = [stay(
            date(2025, 6, 1),
            date(2025, 6, 4),
            ReservationStatus::Confirmed,
        )];

        assert_eq!(day_status(date(2025, 5, 31), &reservations), DayStatus::Free);
        for day in 1..=3 {
            assert_eq!(
                day_status(date(2025, 6, day), &reservations),
                DayStatus::Reserved
            );
        }
        assert_eq!(day_status(date(2025, 6, 4), &reservations), DayStatus::Free);
    }

    #[test]
    fn inactive_statuses_never_reserve() {
        for status in [ReservationStatus::Cancelled, ReservationStatus::Completed] {
            let reservations = [stay(date(2025, 6, 1), date(2025, 6, 4), status)];
            assert_eq!(day_status(date(2025, 6, 2), &reservations), DayStatus::Free);
        }

        let reserved = [stay(
            date(2025, 6, 1),
            date(2025, 6, 4),
            ReservationStatus::Reserved,
        )];
        assert_eq!(day_status(date(2025, 6, 2), &reserved), DayStatus::Reserved);
    }

    #[test]
    fn overlapping_stays_are_still_reserved() {
        let reservations = [
            stay(date(2025, 6, 1), date(2025, 6, 5), ReservationStatus::Confirmed),
            stay(date(2025, 6, 3), date(2025, 6, 8), ReservationStatus::Confirmed),
        ];
        assert_eq!(day_status(date(2025, 6, 4), &reservations), DayStatus::Reserved);
        assert_eq!(day_status(date(2025, 6, 7), &reservations), DayStatus::Reserved);
        assert_eq!(day_status(date(2025, 6, 8), &reservations), DayStatus::Free);
    }

    #[test]
    fn single_night_stay_reserves_only_arrival_day() {
        let reservations = [stay(
            date(2025, 6, 10),
            date(2025, 6, 11),
            ReservationStatus::Confirmed,
        )];
        assert_eq!(day_status(date(2025, 6, 10), &reservations), DayStatus::Reserved);
        assert_eq!(day_status(date(2025, 6, 11), &reservations), DayStatus::Free);
    }

    #[test]
    fn grid_spans_whole_weeks() {
        // June 2025 starts on a Sunday and ends on a Monday.
        let june = YearMonth::new(2025, 6).unwrap();
        let grid = grid(june, &[], date(2025, 6, 15));

        assert_eq!(grid.weeks.len(), 5);
        assert_eq!(grid.weeks[0][0].date, date(2025, 6, 1));
        assert!(grid.weeks[0][0].in_month);
        assert_eq!(grid.weeks[4][1].date, date(2025, 6, 30));
        assert_eq!(grid.weeks[4][6].date, date(2025, 7, 5));
        assert!(!grid.weeks[4][6].in_month);

        let today: Vec<_> = grid
            .weeks
            .iter()
            .flatten()
            .filter(|day| day.is_today)
            .collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, date(2025, 6, 15));
    }

    #[test]
    fn grid_includes_leading_days_from_previous_month() {
        // March 2025 starts on a Saturday.
        let march = YearMonth::new(2025, 3).unwrap();
        let grid = grid(march, &[], date(2025, 1, 1));

        assert_eq!(grid.weeks[0][0].date, date(2025, 2, 23));
        assert!(!grid.weeks[0][0].in_month);
        assert_eq!(grid.weeks[0][6].date, date(2025, 3, 1));
        assert_eq!(grid.weeks.len(), 6);
        assert_eq!(grid.weeks[5][1].date, date(2025, 3, 31));
    }

    #[test]
    fn grid_marks_reserved_days_across_month_edges() {
        let reservations = [stay(
            date(2025, 5, 30),
            date(2025, 6, 2),
            ReservationStatus::Confirmed,
        )];
        let grid = grid(YearMonth::new(2025, 6).unwrap(), &reservations, date(2025, 1, 1));
        let days: Vec<_> = grid.weeks.iter().flatten().collect();

        assert_eq!(days[0].date, date(2025, 6, 1));
        assert_eq!(days[0].status, DayStatus::Reserved);
        assert_eq!(days[1].status, DayStatus::Free);
    }

    #[test]
    fn navigation_shifts_one_month() {
        let mut calendar = Calendar::new(YearMonth::new(2025, 1).unwrap());
        calendar.previous();
        assert_eq!(calendar.displayed(), YearMonth::new(2024, 12).unwrap());
        calendar.next();
        calendar.next();
        assert_eq!(calendar.displayed(), YearMonth::new(2025, 2).unwrap());
    }
}
