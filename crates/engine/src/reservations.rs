//! Reservation editor.
//!
//! Validation happens here, before the store is contacted; the store itself
//! is trusted to accept whatever it is sent. Every successful mutation is
//! followed by a full re-fetch, so callers always hold the store's view.

use std::sync::Arc;

use api_types::reservation::{Reservation, ReservationNew, ReservationStatus, ReservationUpdate};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    provider::Principal,
    store::{DeleteRequest, Query, RecordStore, Table, select_or_empty},
    util::{ensure_amount, normalize_optional_text, normalize_required_text},
};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this reservation?";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReservationsTable;

impl Table for ReservationsTable {
    const NAME: &'static str = "reservations";
    type Row = Reservation;
    type New = ReservationNew;
    type Patch = ReservationUpdate;
}

/// Editor form contents.
#[derive(Clone, Debug, PartialEq)]
pub struct ReservationInput {
    pub guest_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_price: f64,
    /// `None` stores the default, [`ReservationStatus::Confirmed`].
    pub status: Option<ReservationStatus>,
    pub notes: Option<String>,
}

/// Input that passed validation, normalized for the store.
#[derive(Clone, Debug, PartialEq)]
struct Validated {
    guest_name: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    total_price: f64,
    status: ReservationStatus,
    notes: Option<String>,
}

/// Check the form against `today` (the user's current date).
pub fn validate(input: &ReservationInput, today: NaiveDate) -> ResultEngine<()> {
    normalize(input, today).map(|_| ())
}

fn normalize(input: &ReservationInput, today: NaiveDate) -> ResultEngine<Validated> {
    let guest_name = normalize_required_text(&input.guest_name, "Guest name is required")?;
    if input.check_in < today {
        return Err(EngineError::Validation(
            "Check-in date cannot be in the past".to_string(),
        ));
    }
    if input.check_out <= input.check_in {
        return Err(EngineError::Validation(
            "Check-out date must be after check-in date".to_string(),
        ));
    }
    let total_price = ensure_amount(
        input.total_price,
        "Total price must be a non-negative number",
    )?;

    Ok(Validated {
        guest_name,
        check_in: input.check_in,
        check_out: input.check_out,
        total_price,
        status: input.status.unwrap_or_default(),
        notes: normalize_optional_text(input.notes.as_deref()),
    })
}

pub struct ReservationEditor<S> {
    store: Arc<S>,
}

impl<S: RecordStore> ReservationEditor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn query() -> Query {
        Query::new().descending("check_in")
    }

    /// All reservations in scope, latest check-in first.
    pub async fn list(&self) -> ResultEngine<Vec<Reservation>> {
        self.store
            .select::<ReservationsTable>(&Self::query())
            .await
    }

    /// Like [`list`](Self::list), but a failure is logged and read as empty.
    pub async fn refresh(&self) -> Vec<Reservation> {
        select_or_empty::<ReservationsTable, _>(self.store.as_ref(), &Self::query()).await
    }

    /// Validate and insert, then re-fetch.
    pub async fn create(
        &self,
        principal: &Principal,
        input: &ReservationInput,
        today: NaiveDate,
    ) -> ResultEngine<Vec<Reservation>> {
        let valid = normalize(input, today)?;
        let record = ReservationNew {
            user_id: principal.id,
            guest_name: valid.guest_name,
            check_in: valid.check_in,
            check_out: valid.check_out,
            total_price: valid.total_price,
            status: valid.status,
            notes: valid.notes,
        };

        self.store.insert::<ReservationsTable>(&record).await?;
        tracing::info!(guest = %record.guest_name, "reservation created");
        Ok(self.refresh().await)
    }

    /// Validate and overwrite the record `id`, then re-fetch.
    pub async fn update(
        &self,
        id: Uuid,
        input: &ReservationInput,
        today: NaiveDate,
    ) -> ResultEngine<Vec<Reservation>> {
        let valid = normalize(input, today)?;
        let patch = ReservationUpdate {
            guest_name: valid.guest_name,
            check_in: valid.check_in,
            check_out: valid.check_out,
            total_price: valid.total_price,
            status: valid.status,
            notes: valid.notes,
        };

        self.store.update::<ReservationsTable>(id, &patch).await?;
        tracing::info!(%id, "reservation updated");
        Ok(self.refresh().await)
    }

    /// Ask for a delete; the returned request carries the confirmation prompt.
    pub fn request_delete(&self, id: Uuid) -> DeleteRequest<ReservationsTable> {
        DeleteRequest::new(id, DELETE_PROMPT)
    }

    /// Remove a confirmed request's record, then re-fetch.
    pub async fn delete(
        &self,
        request: DeleteRequest<ReservationsTable>,
    ) -> ResultEngine<Vec<Reservation>> {
        let id = request.id();
        self.store.delete::<ReservationsTable>(id).await?;
        tracing::info!(%id, "reservation deleted");
        Ok(self.refresh().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(check_in: NaiveDate, check_out: NaiveDate) -> ReservationInput {
        ReservationInput {
            guest_name: "Rossi".to_string(),
            check_in,
            check_out,
            total_price: 300.0,
            status: None,
            notes: Some("  ".to_string()),
        }
    }

    fn rejection(result: ResultEngine<()>) -> String {
        match result {
            Err(EngineError::Validation(message)) => message,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn check_in_today_is_accepted() {
        let today = date(2025, 6, 1);
        assert!(validate(&input(today, date(2025, 6, 2)), today).is_ok());
    }

    #[test]
    fn check_in_in_the_past_is_rejected() {
        let today = date(2025, 6, 2);
        assert_eq!(
            rejection(validate(&input(date(2025, 6, 1), date(2025, 6, 4)), today)),
            "Check-in date cannot be in the past"
        );
    }

    #[test]
    fn check_out_must_follow_check_in() {
        let today = date(2025, 6, 1);
        for check_out in [date(2025, 6, 3), date(2025, 6, 2)] {
            assert_eq!(
                rejection(validate(&input(date(2025, 6, 3), check_out), today)),
                "Check-out date must be after check-in date"
            );
        }
    }

    #[test]
    fn guest_name_and_price_are_checked() {
        let today = date(2025, 6, 1);
        let mut nameless = input(today, date(2025, 6, 2));
        nameless.guest_name = " ".to_string();
        assert_eq!(
            rejection(validate(&nameless, today)),
            "Guest name is required"
        );

        let mut negative = input(today, date(2025, 6, 2));
        negative.total_price = -1.0;
        assert_eq!(
            rejection(validate(&negative, today)),
            "Total price must be a non-negative number"
        );
    }

    #[test]
    fn normalization_defaults_status_and_drops_blank_notes() {
        let today = date(2025, 6, 1);
        let valid = normalize(&input(today, date(2025, 6, 4)), today).unwrap();
        assert_eq!(valid.status, ReservationStatus::Confirmed);
        assert_eq!(valid.notes, None);
    }
}
