//! Monthly and all-time statistics.

use api_types::{expense::Expense, reservation::Reservation};

use crate::{
    expenses::ExpensesTable,
    month::YearMonth,
    reservations::ReservationsTable,
    store::{Query, RecordStore, select_or_empty},
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Totals {
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
}

impl Totals {
    fn new(revenue: f64, expenses: f64) -> Self {
        Self {
            revenue,
            expenses,
            profit: revenue - expenses,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashboardStats {
    pub month: YearMonth,
    pub monthly: Totals,
    pub all_time: Totals,
    /// Active reservations checking in during `month`.
    pub monthly_bookings: usize,
}

fn finite(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Aggregate the two collections for `month`.
///
/// Revenue only counts confirmed and reserved bookings, attributed to the
/// month of check-in. Expenses count by their date.
pub fn compute(
    reservations: &[Reservation],
    expenses: &[Expense],
    month: YearMonth,
) -> DashboardStats {
    let active = || reservations.iter().filter(|r| r.status.is_active());
    let in_month = || active().filter(|r| month.contains(r.check_in));

    let monthly_revenue: f64 = in_month().map(|r| finite(r.total_price)).sum();
    let monthly_bookings = in_month().count();
    let all_time_revenue: f64 = active().map(|r| finite(r.total_price)).sum();

    let monthly_expenses: f64 = expenses
        .iter()
        .filter(|e| month.contains(e.date))
        .map(|e| finite(e.amount))
        .sum();
    let all_time_expenses: f64 = expenses.iter().map(|e| finite(e.amount)).sum();

    DashboardStats {
        month,
        monthly: Totals::new(monthly_revenue, monthly_expenses),
        all_time: Totals::new(all_time_revenue, all_time_expenses),
        monthly_bookings,
    }
}

/// Dashboard view model: fetched collections, selected month and the stats
/// derived from them.
#[derive(Clone, Debug)]
pub struct Dashboard {
    month: YearMonth,
    reservations: Vec<Reservation>,
    expenses: Vec<Expense>,
    stats: DashboardStats,
}

impl Dashboard {
    pub fn new(month: YearMonth) -> Self {
        Self {
            month,
            reservations: Vec::new(),
            expenses: Vec::new(),
            stats: compute(&[], &[], month),
        }
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn stats(&self) -> &DashboardStats {
        &self.stats
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Swap in freshly fetched collections and recompute.
    pub fn replace(&mut self, reservations: Vec<Reservation>, expenses: Vec<Expense>) {
        self.reservations = reservations;
        self.expenses = expenses;
        self.recompute();
    }

    pub fn select_month(&mut self, month: YearMonth) {
        self.month = month;
        self.recompute();
    }

    pub fn next_month(&mut self) {
        self.select_month(self.month.next());
    }

    pub fn previous_month(&mut self) {
        self.select_month(self.month.previous());
    }

    /// Re-fetch both collections. A failed fetch is logged and counts as empty.
    pub async fn refresh<S: RecordStore>(&mut self, store: &S) {
        let reservations = select_or_empty::<ReservationsTable, _>(store, &Query::new()).await;
        let expenses = select_or_empty::<ExpensesTable, _>(store, &Query::new()).await;
        tracing::debug!(
            reservations = reservations.len(),
            expenses = expenses.len(),
            "dashboard refreshed"
        );
        self.replace(reservations, expenses);
    }

    fn recompute(&mut self) {
        self.stats = compute(&self.reservations, &self.expenses, self.month);
    }
}
