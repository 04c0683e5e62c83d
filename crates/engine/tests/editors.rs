use std::sync::Arc;

use chrono::NaiveDate;
use engine::{
    Engine, EngineError, ExpenseInput, MemoryBackend, ReservationInput, ReservationStatus,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2025, 5, 20)
}

async fn signed_in_engine() -> Engine<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::new().with_account(
        "host@example.com",
        "secret1",
        Some("Anna Host"),
    ));
    let mut engine = Engine::builder().backend(backend).build().await.unwrap();
    engine
        .session_mut()
        .sign_in("host@example.com", "secret1")
        .await
        .unwrap();
    engine
}

fn stay(guest: &str, check_in: NaiveDate, check_out: NaiveDate) -> ReservationInput {
    ReservationInput {
        guest_name: guest.to_string(),
        check_in,
        check_out,
        total_price: 300.0,
        status: None,
        notes: None,
    }
}

#[tokio::test]
async fn create_lists_latest_check_in_first() {
    let engine = signed_in_engine().await;

    engine
        .create_reservation(&stay("Rossi", date(2025, 6, 1), date(2025, 6, 4)), today())
        .await
        .unwrap();
    let reservations = engine
        .create_reservation(&stay("Bianchi", date(2025, 7, 10), date(2025, 7, 12)), today())
        .await
        .unwrap();

    let guests: Vec<_> = reservations.iter().map(|r| r.guest_name.as_str()).collect();
    assert_eq!(guests, ["Bianchi", "Rossi"]);
    assert_eq!(reservations[1].status, ReservationStatus::Confirmed);
    assert_eq!(
        reservations[0].user_id,
        engine.principal().unwrap().id
    );
}

#[tokio::test]
async fn invalid_reservations_never_reach_the_store() {
    let engine = signed_in_engine().await;
    let calls = engine.backend().store_calls();

    let backwards = engine
        .create_reservation(&stay("Rossi", date(2025, 6, 4), date(2025, 6, 1)), today())
        .await;
    assert_eq!(
        backwards,
        Err(EngineError::Validation(
            "Check-out date must be after check-in date".to_string()
        ))
    );

    let past = engine
        .create_reservation(&stay("Rossi", date(2025, 5, 19), date(2025, 5, 22)), today())
        .await;
    assert_eq!(
        past,
        Err(EngineError::Validation(
            "Check-in date cannot be in the past".to_string()
        ))
    );

    assert_eq!(engine.backend().store_calls(), calls);
}

#[tokio::test]
async fn update_overwrites_every_field() {
    let engine = signed_in_engine().await;
    let created = engine
        .create_reservation(&stay("Rossi", date(2025, 6, 1), date(2025, 6, 4)), today())
        .await
        .unwrap();
    let id = created[0].id;

    let mut edited = stay("Rossi family", date(2025, 6, 2), date(2025, 6, 6));
    edited.total_price = 410.5;
    edited.status = Some(ReservationStatus::Reserved);
    edited.notes = Some(" late arrival ".to_string());
    let updated = engine
        .reservations()
        .update(id, &edited, today())
        .await
        .unwrap();

    assert_eq!(updated.len(), 1);
    let reservation = &updated[0];
    assert_eq!(reservation.id, id);
    assert_eq!(reservation.guest_name, "Rossi family");
    assert_eq!(reservation.check_out, date(2025, 6, 6));
    assert_eq!(reservation.total_price, 410.5);
    assert_eq!(reservation.status, ReservationStatus::Reserved);
    assert_eq!(reservation.notes.as_deref(), Some("late arrival"));
}

#[tokio::test]
async fn invalid_updates_never_reach_the_store() {
    let engine = signed_in_engine().await;
    let created = engine
        .create_reservation(&stay("Rossi", date(2025, 6, 1), date(2025, 6, 4)), today())
        .await
        .unwrap();
    let id = created[0].id;
    let calls = engine.backend().store_calls();

    let backwards = engine
        .reservations()
        .update(id, &stay("Rossi", date(2025, 6, 4), date(2025, 6, 4)), today())
        .await;
    assert_eq!(
        backwards,
        Err(EngineError::Validation(
            "Check-out date must be after check-in date".to_string()
        ))
    );

    let past = engine
        .reservations()
        .update(id, &stay("Rossi", date(2025, 5, 1), date(2025, 6, 4)), today())
        .await;
    assert_eq!(
        past,
        Err(EngineError::Validation(
            "Check-in date cannot be in the past".to_string()
        ))
    );

    assert_eq!(engine.backend().store_calls(), calls);
    let stored = engine.reservations().list().await.unwrap();
    assert_eq!(stored[0].check_in, date(2025, 6, 1));
}

#[tokio::test]
async fn invalid_expenses_never_reach_the_store() {
    let engine = signed_in_engine().await;
    let calls = engine.backend().store_calls();

    let blank = engine
        .create_expense(&ExpenseInput {
            description: "   ".to_string(),
            amount: 50.0,
            category: None,
            date: today(),
        })
        .await;
    assert_eq!(
        blank,
        Err(EngineError::Validation("Description is required".to_string()))
    );

    let negative = engine
        .create_expense(&ExpenseInput {
            description: "Pool cleaning".to_string(),
            amount: -5.0,
            category: None,
            date: today(),
        })
        .await;
    assert_eq!(
        negative,
        Err(EngineError::Validation(
            "Amount must be a non-negative number".to_string()
        ))
    );

    assert_eq!(engine.backend().store_calls(), calls);
}

#[tokio::test]
async fn delete_requires_a_request_and_refreshes() {
    let engine = signed_in_engine().await;
    let created = engine
        .create_reservation(&stay("Rossi", date(2025, 6, 1), date(2025, 6, 4)), today())
        .await
        .unwrap();

    let request = engine.reservations().request_delete(created[0].id);
    assert_eq!(
        request.prompt(),
        "Are you sure you want to delete this reservation?"
    );
    let remaining = engine.reservations().delete(request).await.unwrap();

    assert!(remaining.is_empty());
    assert!(engine.reservations().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn store_failures_surface_on_mutation_and_empty_on_refresh() {
    let engine = signed_in_engine().await;

    engine
        .backend()
        .fail_next_store_call("connection reset")
        .unwrap();
    let failed = engine
        .create_reservation(&stay("Rossi", date(2025, 6, 1), date(2025, 6, 4)), today())
        .await;
    assert_eq!(failed, Err(EngineError::Store("connection reset".to_string())));

    engine
        .create_reservation(&stay("Rossi", date(2025, 6, 1), date(2025, 6, 4)), today())
        .await
        .unwrap();
    engine
        .backend()
        .fail_next_store_call("connection reset")
        .unwrap();
    assert!(engine.reservations().refresh().await.is_empty());
    assert_eq!(engine.reservations().refresh().await.len(), 1);
}

#[tokio::test]
async fn mutations_require_a_principal() {
    let backend = Arc::new(MemoryBackend::new());
    let engine = Engine::builder().backend(backend).build().await.unwrap();

    let result = engine
        .create_expense(&ExpenseInput {
            description: "Pool cleaning".to_string(),
            amount: 50.0,
            category: None,
            date: today(),
        })
        .await;
    assert_eq!(result, Err(EngineError::Unauthenticated));
}

#[tokio::test]
async fn expenses_default_category_and_sort_by_date() {
    let engine = signed_in_engine().await;

    engine
        .create_expense(&ExpenseInput {
            description: "Pool cleaning".to_string(),
            amount: 50.0,
            category: None,
            date: date(2025, 6, 2),
        })
        .await
        .unwrap();
    let expenses = engine
        .create_expense(&ExpenseInput {
            description: "Light bulbs".to_string(),
            amount: 12.4,
            category: Some("supplies".to_string()),
            // Expenses may be back-dated.
            date: date(2024, 12, 30),
        })
        .await
        .unwrap();

    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0].description, "Pool cleaning");
    assert_eq!(expenses[0].category, "other");
    assert_eq!(expenses[1].category, "supplies");

    let request = engine.expenses().request_delete(expenses[1].id);
    assert_eq!(request.prompt(), "Delete this expense?");
    let remaining = engine.expenses().delete(request).await.unwrap();
    assert_eq!(remaining.len(), 1);
}

#[tokio::test]
async fn rows_are_scoped_to_their_owner() {
    let backend = Arc::new(
        MemoryBackend::new()
            .with_account("host@example.com", "secret1", None)
            .with_account("other@example.com", "secret2", None),
    );
    let mut engine = Engine::builder()
        .backend(Arc::clone(&backend))
        .build()
        .await
        .unwrap();

    engine
        .session_mut()
        .sign_in("host@example.com", "secret1")
        .await
        .unwrap();
    engine
        .create_reservation(&stay("Rossi", date(2025, 6, 1), date(2025, 6, 4)), today())
        .await
        .unwrap();
    engine.session_mut().sign_out().await.unwrap();

    engine
        .session_mut()
        .sign_in("other@example.com", "secret2")
        .await
        .unwrap();
    assert!(engine.reservations().list().await.unwrap().is_empty());
}
