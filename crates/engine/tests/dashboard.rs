use std::sync::Arc;

use chrono::NaiveDate;
use engine::{
    Calendar, Dashboard, DayStatus, Engine, ExpenseInput, MemoryBackend, ReservationInput,
    ReservationStatus, YearMonth, day_status,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn signed_in_engine() -> Engine<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::new().with_account("host@example.com", "secret1", None));
    let mut engine = Engine::builder().backend(backend).build().await.unwrap();
    engine
        .session_mut()
        .sign_in("host@example.com", "secret1")
        .await
        .unwrap();
    engine
}

async fn seed_june(engine: &Engine<MemoryBackend>) {
    engine
        .create_reservation(
            &ReservationInput {
                guest_name: "Rossi".to_string(),
                check_in: date(2025, 6, 1),
                check_out: date(2025, 6, 4),
                total_price: 300.0,
                status: Some(ReservationStatus::Confirmed),
                notes: None,
            },
            date(2025, 5, 1),
        )
        .await
        .unwrap();
    engine
        .create_expense(&ExpenseInput {
            description: "Pool cleaning".to_string(),
            amount: 50.0,
            category: Some("maintenance".to_string()),
            date: date(2025, 6, 2),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn june_scenario() {
    let engine = signed_in_engine().await;
    seed_june(&engine).await;

    let june = YearMonth::new(2025, 6).unwrap();
    let mut dashboard = Dashboard::new(june);
    engine.refresh_dashboard(&mut dashboard).await;

    let stats = dashboard.stats();
    assert_eq!(stats.monthly.revenue, 300.0);
    assert_eq!(stats.monthly.expenses, 50.0);
    assert_eq!(stats.monthly.profit, 250.0);
    assert_eq!(stats.monthly_bookings, 1);

    let reservations = dashboard.reservations();
    for day in 1..=3 {
        assert_eq!(day_status(date(2025, 6, day), reservations), DayStatus::Reserved);
    }
    assert_eq!(day_status(date(2025, 6, 4), reservations), DayStatus::Free);

    let grid = Calendar::new(june).grid(reservations, date(2025, 6, 2));
    let reserved = grid
        .weeks
        .iter()
        .flatten()
        .filter(|day| day.status == DayStatus::Reserved)
        .count();
    assert_eq!(reserved, 3);
}

#[tokio::test]
async fn deleted_records_leave_the_totals() {
    let engine = signed_in_engine().await;
    seed_june(&engine).await;

    let reservations = engine.reservations().list().await.unwrap();
    let request = engine.reservations().request_delete(reservations[0].id);
    engine.reservations().delete(request).await.unwrap();

    let mut dashboard = Dashboard::new(YearMonth::new(2025, 6).unwrap());
    engine.refresh_dashboard(&mut dashboard).await;

    assert_eq!(dashboard.stats().monthly.revenue, 0.0);
    assert_eq!(dashboard.stats().monthly.profit, -50.0);
    assert_eq!(dashboard.stats().all_time.revenue, 0.0);
    assert_eq!(dashboard.stats().monthly_bookings, 0);
}

#[tokio::test]
async fn failed_fetch_reads_as_empty() {
    let engine = signed_in_engine().await;
    seed_june(&engine).await;
    engine.backend().fail_next_store_call("timeout").unwrap();

    let mut dashboard = Dashboard::new(YearMonth::new(2025, 6).unwrap());
    engine.refresh_dashboard(&mut dashboard).await;

    // Reservations failed, expenses still arrived.
    assert!(dashboard.reservations().is_empty());
    assert_eq!(dashboard.expenses().len(), 1);
    assert_eq!(dashboard.stats().monthly.profit, -50.0);
}
