//! Process-local backend.
//!
//! [`MemoryBackend`] implements both collaborator contracts on top of plain
//! collections. Rows are kept as JSON objects so every [`Table`] goes through
//! the same serialization path as the hosted table API, and row-level
//! security is emulated by matching each row's `user_id` against the signed-in
//! account.

use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use api_types::auth::{AuthEvent, AuthEventKind, AuthSession, User, UserMetadata};
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    provider::IdentityProvider,
    store::{Query, RecordStore, Table},
};

const SESSION_TTL_SECS: i64 = 3600;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Debug)]
struct Account {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: Vec<Account>,
    session: Option<AuthSession>,
    tables: HashMap<&'static str, Vec<Map<String, Value>>>,
    issued_tokens: u64,
    fail_next: Option<String>,
    store_calls: usize,
}

impl Inner {
    fn issue_session(&mut self, user: User) -> AuthSession {
        self.issued_tokens += 1;
        let now = Utc::now().timestamp();
        AuthSession {
            access_token: format!("memory-access-{}", self.issued_tokens),
            refresh_token: format!("memory-refresh-{}", self.issued_tokens),
            token_type: Some("bearer".to_string()),
            expires_in: Some(SESSION_TTL_SECS),
            expires_at: Some(now + SESSION_TTL_SECS),
            user,
        }
    }

    /// Count the call and consume an injected failure, if any.
    fn begin_store_call(&mut self) -> ResultEngine<()> {
        self.store_calls += 1;
        match self.fail_next.take() {
            Some(message) => Err(EngineError::Store(message)),
            None => Ok(()),
        }
    }

    fn owner(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|session| session.user.id.to_string())
    }
}

#[derive(Debug)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            inner: Mutex::new(Inner::default()),
            events,
        }
    }

    /// Register an account up front. The account is not signed in.
    pub fn with_account(self, email: &str, password: &str, full_name: Option<&str>) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.accounts.push(Account {
                user: User {
                    id: Uuid::new_v4(),
                    email: Some(email.to_string()),
                    user_metadata: UserMetadata {
                        full_name: full_name.map(ToString::to_string),
                    },
                },
                password: password.to_string(),
            });
        }
        self
    }

    /// Drop the current session as if it had expired on the provider side.
    pub fn expire_session(&self) -> ResultEngine<()> {
        self.lock()?.session = None;
        self.emit(AuthEventKind::SignedOut, None);
        Ok(())
    }

    /// Rotate the current session's tokens. Returns `false` when signed out.
    pub fn refresh_session(&self) -> ResultEngine<bool> {
        let refreshed = {
            let mut inner = self.lock()?;
            match inner.session.as_ref().map(|session| session.user.clone()) {
                Some(user) => {
                    let session = inner.issue_session(user);
                    inner.session = Some(session.clone());
                    Some(session)
                }
                None => None,
            }
        };

        let Some(session) = refreshed else {
            return Ok(false);
        };
        self.emit(AuthEventKind::TokenRefreshed, Some(session));
        Ok(true)
    }

    /// Make the next store call fail with `message`.
    pub fn fail_next_store_call(&self, message: impl Into<String>) -> ResultEngine<()> {
        self.lock()?.fail_next = Some(message.into());
        Ok(())
    }

    /// Number of store calls served so far, failed ones included.
    pub fn store_calls(&self) -> usize {
        self.inner.lock().map(|inner| inner.store_calls).unwrap_or(0)
    }

    fn lock(&self) -> ResultEngine<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| EngineError::Store("memory backend lock poisoned".to_string()))
    }

    fn emit(&self, kind: AuthEventKind, session: Option<AuthSession>) {
        // No subscribers is fine.
        let _ = self.events.send(AuthEvent { kind, session });
    }
}

impl IdentityProvider for MemoryBackend {
    async fn get_session(&self) -> ResultEngine<Option<AuthSession>> {
        Ok(self.lock()?.session.clone())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: UserMetadata,
    ) -> ResultEngine<Option<AuthSession>> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(EngineError::Auth(
                "Password should be at least 6 characters".to_string(),
            ));
        }

        let session = {
            let mut inner = self.lock()?;
            let taken = inner.accounts.iter().any(|account| {
                account
                    .user
                    .email
                    .as_deref()
                    .is_some_and(|existing| existing.eq_ignore_ascii_case(email))
            });
            if taken {
                return Err(EngineError::Auth("User already registered".to_string()));
            }

            let user = User {
                id: Uuid::new_v4(),
                email: Some(email.to_string()),
                user_metadata: metadata,
            };
            inner.accounts.push(Account {
                user: user.clone(),
                password: password.to_string(),
            });
            let session = inner.issue_session(user);
            inner.session = Some(session.clone());
            session
        };

        self.emit(AuthEventKind::SignedIn, Some(session.clone()));
        Ok(Some(session))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ResultEngine<AuthSession> {
        let session = {
            let mut inner = self.lock()?;
            let user = inner
                .accounts
                .iter()
                .find(|account| {
                    account.password == password
                        && account
                            .user
                            .email
                            .as_deref()
                            .is_some_and(|existing| existing.eq_ignore_ascii_case(email))
                })
                .map(|account| account.user.clone())
                .ok_or_else(|| EngineError::Auth("Invalid login credentials".to_string()))?;
            let session = inner.issue_session(user);
            inner.session = Some(session.clone());
            session
        };

        self.emit(AuthEventKind::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> ResultEngine<()> {
        self.lock()?.session = None;
        self.emit(AuthEventKind::SignedOut, None);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

fn to_object<V: serde::Serialize>(value: &V) -> ResultEngine<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(EngineError::Store(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(err) => Err(EngineError::Store(err.to_string())),
    }
}

fn column_text(row: &Map<String, Value>, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn compare_column(a: &Map<String, Value>, b: &Map<String, Value>, column: &str) -> Ordering {
    match (a.get(column), b.get(column)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Null) | None, Some(Value::Null) | None) => Ordering::Equal,
        // Nulls sort last ascending, like the table API's default.
        (Some(Value::Null) | None, _) => Ordering::Greater,
        (_, Some(Value::Null) | None) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn is_owned_by(row: &Map<String, Value>, owner: &str, id: Uuid) -> bool {
    column_text(row, "user_id").as_deref() == Some(owner)
        && column_text(row, "id") == Some(id.to_string())
}

impl RecordStore for MemoryBackend {
    async fn select<T: Table>(&self, query: &Query) -> ResultEngine<Vec<T::Row>> {
        let mut inner = self.lock()?;
        inner.begin_store_call()?;
        let Some(owner) = inner.owner() else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<&Map<String, Value>> = inner
            .tables
            .get(T::NAME)
            .map(|rows| {
                rows.iter()
                    .filter(|row| column_text(row, "user_id").as_deref() == Some(owner.as_str()))
                    .filter(|row| {
                        query.filters.iter().all(|(column, value)| {
                            column_text(row, column).as_deref() == Some(value.as_str())
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_column(a, b, order.column);
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        rows.into_iter()
            .map(|row| {
                serde_json::from_value(Value::Object(row.clone()))
                    .map_err(|err| EngineError::Store(err.to_string()))
            })
            .collect()
    }

    async fn insert<T: Table>(&self, record: &T::New) -> ResultEngine<()> {
        let mut row = to_object(record)?;
        let mut inner = self.lock()?;
        inner.begin_store_call()?;

        let owner = inner.owner();
        if owner.is_none() || column_text(&row, "user_id") != owner {
            return Err(EngineError::Store(format!(
                "new row violates row-level security policy for table \"{}\"",
                T::NAME
            )));
        }

        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        row.insert(
            "created_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        inner.tables.entry(T::NAME).or_default().push(row);
        Ok(())
    }

    async fn update<T: Table>(&self, id: Uuid, patch: &T::Patch) -> ResultEngine<()> {
        let patch = to_object(patch)?;
        let mut inner = self.lock()?;
        inner.begin_store_call()?;
        let Some(owner) = inner.owner() else {
            return Ok(());
        };

        // Rows outside the caller's scope are silently untouched.
        if let Some(rows) = inner.tables.get_mut(T::NAME) {
            for row in rows.iter_mut().filter(|row| is_owned_by(row, &owner, id)) {
                for (column, value) in &patch {
                    row.insert(column.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete<T: Table>(&self, id: Uuid) -> ResultEngine<()> {
        let mut inner = self.lock()?;
        inner.begin_store_call()?;
        let Some(owner) = inner.owner() else {
            return Ok(());
        };

        if let Some(rows) = inner.tables.get_mut(T::NAME) {
            rows.retain(|row| !is_owned_by(row, &owner, id));
        }
        Ok(())
    }
}
