//! Demo data for the in-memory backend.

use api_types::{
    expense::{ExpenseCategory, ExpenseNew},
    reservation::{ReservationNew, ReservationStatus},
};
use chrono::{Days, NaiveDate};
use engine::{
    ExpensesTable, IdentityProvider, MemoryBackend, RecordStore, ReservationsTable, ResultEngine,
};

pub const DEMO_EMAIL: &str = "demo@villa.local";
pub const DEMO_PASSWORD: &str = "demo1234";

fn shift(day: NaiveDate, offset: i64) -> NaiveDate {
    let days = Days::new(offset.unsigned_abs());
    let shifted = if offset >= 0 {
        day.checked_add_days(days)
    } else {
        day.checked_sub_days(days)
    };
    shifted.unwrap_or(day)
}

/// A backend holding one demo account with a few bookings and expenses
/// around `today`. The demo account is left signed in.
pub async fn seeded_backend(today: NaiveDate) -> ResultEngine<MemoryBackend> {
    let backend = MemoryBackend::new().with_account(DEMO_EMAIL, DEMO_PASSWORD, Some("Demo Host"));
    let session = backend
        .sign_in_with_password(DEMO_EMAIL, DEMO_PASSWORD)
        .await?;
    let owner = session.user.id;

    let stays = [
        ("Rossi family", -12, -8, 640.0, ReservationStatus::Completed, None),
        ("Anna Weber", -2, 3, 750.0, ReservationStatus::Confirmed, Some("Late check-in")),
        ("Luca Bianchi", 6, 9, 420.0, ReservationStatus::Reserved, None),
        ("Sophie Martin", 14, 21, 1180.0, ReservationStatus::Confirmed, None),
        ("John Smith", 24, 26, 300.0, ReservationStatus::Cancelled, Some("Flight cancelled")),
    ];
    for (guest, arrive, leave, price, status, notes) in stays {
        let record = ReservationNew {
            user_id: owner,
            guest_name: guest.to_string(),
            check_in: shift(today, arrive),
            check_out: shift(today, leave),
            total_price: price,
            status,
            notes: notes.map(ToString::to_string),
        };
        backend.insert::<ReservationsTable>(&record).await?;
    }

    let expenses = [
        ("Pool cleaning", 80.0, ExpenseCategory::Maintenance, -10),
        ("Linen and towels", 145.5, ExpenseCategory::Supplies, -4),
        ("Electricity bill", 210.0, ExpenseCategory::Utilities, -1),
        ("Welcome basket", 35.0, ExpenseCategory::Other, 0),
    ];
    for (description, amount, category, offset) in expenses {
        let record = ExpenseNew {
            user_id: owner,
            description: description.to_string(),
            amount,
            category: category.as_str().to_string(),
            date: shift(today, offset),
        };
        backend.insert::<ExpensesTable>(&record).await?;
    }

    tracing::info!("demo data seeded for {DEMO_EMAIL}");
    Ok(backend)
}
