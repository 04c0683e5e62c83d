//! Expense editor: list, create and delete. Expenses are never edited in place.

use std::sync::Arc;

use api_types::expense::{Expense, ExpenseCategory, ExpenseNew};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    ResultEngine,
    provider::Principal,
    store::{DeleteRequest, Query, RecordStore, Table, select_or_empty},
    util::{ensure_amount, normalize_optional_text, normalize_required_text},
};

pub const DELETE_PROMPT: &str = "Delete this expense?";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExpensesTable;

impl Table for ExpensesTable {
    const NAME: &'static str = "expenses";
    type Row = Expense;
    type New = ExpenseNew;
    // No update path is exposed for expenses.
    type Patch = ExpenseNew;
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseInput {
    pub description: String,
    pub amount: f64,
    /// Free-form; blank falls back to `other`.
    pub category: Option<String>,
    pub date: NaiveDate,
}

pub fn validate(input: &ExpenseInput) -> ResultEngine<()> {
    normalize(input).map(|_| ())
}

/// Validated fields: trimmed description, checked amount, category with
/// its default applied.
fn normalize(input: &ExpenseInput) -> ResultEngine<(String, f64, String)> {
    let description = normalize_required_text(&input.description, "Description is required")?;
    let amount = ensure_amount(input.amount, "Amount must be a non-negative number")?;
    let category = normalize_optional_text(input.category.as_deref())
        .unwrap_or_else(|| ExpenseCategory::default().as_str().to_string());
    Ok((description, amount, category))
}

pub struct ExpenseEditor<S> {
    store: Arc<S>,
}

impl<S: RecordStore> ExpenseEditor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn query() -> Query {
        Query::new().descending("date")
    }

    /// All expenses in scope, most recent first.
    pub async fn list(&self) -> ResultEngine<Vec<Expense>> {
        self.store.select::<ExpensesTable>(&Self::query()).await
    }

    pub async fn refresh(&self) -> Vec<Expense> {
        select_or_empty::<ExpensesTable, _>(self.store.as_ref(), &Self::query()).await
    }

    pub async fn create(
        &self,
        principal: &Principal,
        input: &ExpenseInput,
    ) -> ResultEngine<Vec<Expense>> {
        let (description, amount, category) = normalize(input)?;

        let record = ExpenseNew {
            user_id: principal.id,
            description,
            amount,
            category,
            date: input.date,
        };

        self.store.insert::<ExpensesTable>(&record).await?;
        tracing::info!(amount = record.amount, "expense created");
        Ok(self.refresh().await)
    }

    pub fn request_delete(&self, id: Uuid) -> DeleteRequest<ExpensesTable> {
        DeleteRequest::new(id, DELETE_PROMPT)
    }

    pub async fn delete(&self, request: DeleteRequest<ExpensesTable>) -> ResultEngine<Vec<Expense>> {
        let id = request.id();
        self.store.delete::<ExpensesTable>(id).await?;
        tracing::info!(%id, "expense deleted");
        Ok(self.refresh().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;

    fn input(description: &str, amount: f64) -> ExpenseInput {
        ExpenseInput {
            description: description.to_string(),
            amount,
            category: None,
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        }
    }

    #[test]
    fn past_dates_are_fine_for_expenses() {
        assert!(validate(&input("Pool cleaning", 50.0)).is_ok());
    }

    #[test]
    fn description_and_amount_are_required() {
        assert_eq!(
            validate(&input("", 50.0)),
            Err(EngineError::Validation("Description is required".to_string()))
        );
        assert_eq!(
            validate(&input("Pool cleaning", -5.0)),
            Err(EngineError::Validation(
                "Amount must be a non-negative number".to_string()
            ))
        );
    }
}
