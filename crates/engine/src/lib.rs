//! Domain logic for the villa manager: session state, route guarding,
//! reservation and expense editing, dashboard aggregation and the occupancy
//! calendar.
//!
//! Persistence and identity live behind the [`IdentityProvider`] and
//! [`RecordStore`] traits; [`Engine`] wires one backend implementing both
//! into the session and the editors.

use std::sync::Arc;

use chrono::NaiveDate;

pub use api_types::{
    auth::{AuthEvent, AuthEventKind, AuthSession},
    expense::{Expense, ExpenseCategory},
    reservation::{Reservation, ReservationStatus},
};
pub use calendar::{Calendar, CalendarDay, CalendarGrid, DayStatus, WEEKDAY_LABELS, day_status};
pub use dashboard::{Dashboard, DashboardStats, Totals, compute};
pub use error::EngineError;
pub use expenses::{ExpenseEditor, ExpenseInput, ExpensesTable};
pub use guard::{Guard, Route, guard};
pub use memory::MemoryBackend;
pub use month::YearMonth;
pub use provider::{IdentityProvider, Principal, SignUpOutcome};
pub use reservations::{ReservationEditor, ReservationInput, ReservationsTable};
pub use session::{Session, SessionState};
pub use store::{DeleteRequest, Order, Query, RecordStore, Table};

pub mod calendar;
pub mod dashboard;
mod error;
pub mod expenses;
mod guard;
pub mod memory;
mod month;
pub mod provider;
pub mod reservations;
mod session;
pub mod store;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;

/// A backend serving both collaborator contracts.
pub trait Backend: IdentityProvider + RecordStore + 'static {}

impl<T: IdentityProvider + RecordStore + 'static> Backend for T {}

pub struct Engine<B> {
    backend: Arc<B>,
    session: Session<B>,
    reservations: ReservationEditor<B>,
    expenses: ExpenseEditor<B>,
}

impl<B: Backend> Engine<B> {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder<B> {
        EngineBuilder::default()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<B> {
        &mut self.session
    }

    pub fn reservations(&self) -> &ReservationEditor<B> {
        &self.reservations
    }

    pub fn expenses(&self) -> &ExpenseEditor<B> {
        &self.expenses
    }

    /// The signed-in principal, or [`EngineError::Unauthenticated`].
    pub fn principal(&self) -> ResultEngine<Principal> {
        self.session
            .principal()
            .ok_or(EngineError::Unauthenticated)
    }

    /// Create a reservation owned by the signed-in principal.
    pub async fn create_reservation(
        &self,
        input: &ReservationInput,
        today: NaiveDate,
    ) -> ResultEngine<Vec<Reservation>> {
        let principal = self.principal()?;
        self.reservations.create(&principal, input, today).await
    }

    /// Create an expense owned by the signed-in principal.
    pub async fn create_expense(&self, input: &ExpenseInput) -> ResultEngine<Vec<Expense>> {
        let principal = self.principal()?;
        self.expenses.create(&principal, input).await
    }

    /// Re-fetch a dashboard's collections through this engine's store.
    pub async fn refresh_dashboard(&self, dashboard: &mut Dashboard) {
        dashboard.refresh(self.backend.as_ref()).await;
    }
}

pub struct EngineBuilder<B> {
    backend: Option<Arc<B>>,
}

impl<B> Default for EngineBuilder<B> {
    fn default() -> Self {
        Self { backend: None }
    }
}

impl<B: Backend> EngineBuilder<B> {
    /// Pass the required backend
    pub fn backend(mut self, backend: Arc<B>) -> EngineBuilder<B> {
        self.backend = Some(backend);
        self
    }

    /// Construct `Engine` and resolve the initial session.
    pub async fn build(self) -> ResultEngine<Engine<B>> {
        let backend = self
            .backend
            .ok_or_else(|| EngineError::Config("missing backend".to_string()))?;

        let mut session = Session::new(Arc::clone(&backend));
        session.resolve().await;

        Ok(Engine {
            reservations: ReservationEditor::new(Arc::clone(&backend)),
            expenses: ExpenseEditor::new(Arc::clone(&backend)),
            session,
            backend,
        })
    }
}
