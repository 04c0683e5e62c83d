//! Contract with the hosted record store.
//!
//! The store exposes one table API per entity. A [`Table`] names the table and
//! the row/insert/patch shapes; [`RecordStore`] is generic over it so a
//! single implementation serves every entity.

use std::{future::Future, marker::PhantomData};

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::ResultEngine;

/// Static description of a remote table.
pub trait Table: Send + Sync + 'static {
    const NAME: &'static str;
    type Row: DeserializeOwned + Send + 'static;
    type New: Serialize + Sync;
    type Patch: Serialize + Sync;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

/// Row selection: equality filters plus at most one order clause.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<(&'static str, String)>,
    pub order: Option<Order>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    pub fn ascending(mut self, column: &'static str) -> Self {
        self.order = Some(Order {
            column,
            ascending: true,
        });
        self
    }

    pub fn descending(mut self, column: &'static str) -> Self {
        self.order = Some(Order {
            column,
            ascending: false,
        });
        self
    }
}

/// Table-oriented persistence. Every error is terminal for the operation.
pub trait RecordStore: Send + Sync {
    fn select<T: Table>(
        &self,
        query: &Query,
    ) -> impl Future<Output = ResultEngine<Vec<T::Row>>> + Send;

    fn insert<T: Table>(&self, record: &T::New) -> impl Future<Output = ResultEngine<()>> + Send;

    fn update<T: Table>(
        &self,
        id: Uuid,
        patch: &T::Patch,
    ) -> impl Future<Output = ResultEngine<()>> + Send;

    fn delete<T: Table>(&self, id: Uuid) -> impl Future<Output = ResultEngine<()>> + Send;
}

/// A delete that has been asked for but not yet confirmed.
///
/// Editors only remove a record when handed back the request they issued, so
/// the caller has to present [`prompt`](DeleteRequest::prompt) to the user
/// first. Dropping the request is how a delete is declined.
#[must_use = "nothing is deleted until the request is confirmed"]
#[derive(Debug)]
pub struct DeleteRequest<T> {
    id: Uuid,
    prompt: &'static str,
    table: PhantomData<T>,
}

impl<T: Table> DeleteRequest<T> {
    pub(crate) fn new(id: Uuid, prompt: &'static str) -> Self {
        Self {
            id,
            prompt,
            table: PhantomData,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn prompt(&self) -> &'static str {
        self.prompt
    }
}

/// Fetch rows, logging a failure and reading it as an empty result.
pub(crate) async fn select_or_empty<T: Table, S: RecordStore>(
    store: &S,
    query: &Query,
) -> Vec<T::Row> {
    match store.select::<T>(query).await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::error!(table = T::NAME, "failed to fetch rows: {err}");
            Vec::new()
        }
    }
}
