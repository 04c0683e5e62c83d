use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lenient reader for monetary columns.
///
/// The table API returns `numeric` columns as JSON numbers, but rows written by
/// older clients may carry strings, nulls or nothing at all. Anything that is
/// not a finite number reads as `0.0`.
pub mod amount {
    use serde::{Deserialize, Deserializer, de::IgnoredAny};

    #[derive(Deserialize)]
    #[serde(untagged)]
    #[allow(dead_code)]
    enum RawAmount {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Option::<RawAmount>::deserialize(deserializer)? {
            Some(RawAmount::Number(value)) => value,
            Some(RawAmount::Text(text)) => text.trim().parse().unwrap_or(0.0),
            Some(RawAmount::Other(_)) | None => 0.0,
        };

        Ok(if value.is_finite() { value } else { 0.0 })
    }
}

pub mod reservation {
    use super::*;

    /// Lifecycle state of a reservation as stored in the `reservations` table.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ReservationStatus {
        #[default]
        Confirmed,
        /// Older editors wrote `pending` for bookings held but not yet confirmed.
        #[serde(alias = "pending")]
        Reserved,
        Cancelled,
        Completed,
    }

    impl ReservationStatus {
        pub const ALL: [ReservationStatus; 4] = [
            Self::Confirmed,
            Self::Reserved,
            Self::Cancelled,
            Self::Completed,
        ];

        pub fn label(self) -> &'static str {
            match self {
                Self::Confirmed => "Confirmed",
                Self::Reserved => "Reserved",
                Self::Cancelled => "Cancelled",
                Self::Completed => "Completed",
            }
        }

        /// Whether the reservation occupies the property and earns revenue.
        pub fn is_active(self) -> bool {
            matches!(self, Self::Confirmed | Self::Reserved)
        }
    }

    /// A row of the `reservations` table.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Reservation {
        pub id: Uuid,
        pub user_id: Uuid,
        pub guest_name: String,
        pub check_in: NaiveDate,
        /// Departure day. The property is free again on this date.
        pub check_out: NaiveDate,
        #[serde(default, deserialize_with = "crate::amount::deserialize")]
        pub total_price: f64,
        pub status: ReservationStatus,
        #[serde(default)]
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    /// Insert payload. `id` and `created_at` are assigned by the store.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ReservationNew {
        pub user_id: Uuid,
        pub guest_name: String,
        pub check_in: NaiveDate,
        pub check_out: NaiveDate,
        pub total_price: f64,
        pub status: ReservationStatus,
        pub notes: Option<String>,
    }

    /// Patch payload. Every editable column is overwritten.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ReservationUpdate {
        pub guest_name: String,
        pub check_in: NaiveDate,
        pub check_out: NaiveDate,
        pub total_price: f64,
        pub status: ReservationStatus,
        pub notes: Option<String>,
    }
}

pub mod expense {
    use super::*;

    /// Categories offered by the expense form.
    ///
    /// The `category` column itself is free text; this list is not enforced
    /// by the store.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ExpenseCategory {
        Maintenance,
        Supplies,
        Utilities,
        #[default]
        Other,
    }

    impl ExpenseCategory {
        pub const ALL: [ExpenseCategory; 4] = [
            Self::Maintenance,
            Self::Supplies,
            Self::Utilities,
            Self::Other,
        ];

        pub fn as_str(self) -> &'static str {
            match self {
                Self::Maintenance => "maintenance",
                Self::Supplies => "supplies",
                Self::Utilities => "utilities",
                Self::Other => "other",
            }
        }

        pub fn label(self) -> &'static str {
            match self {
                Self::Maintenance => "Maintenance",
                Self::Supplies => "Supplies",
                Self::Utilities => "Utilities",
                Self::Other => "Other",
            }
        }
    }

    /// A row of the `expenses` table.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Expense {
        pub id: Uuid,
        pub user_id: Uuid,
        pub description: String,
        #[serde(default, deserialize_with = "crate::amount::deserialize")]
        pub amount: f64,
        #[serde(default)]
        pub category: String,
        pub date: NaiveDate,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub user_id: Uuid,
        pub description: String,
        pub amount: f64,
        pub category: String,
        pub date: NaiveDate,
    }
}

pub mod auth {
    use super::*;

    /// Free-form metadata attached to an account at sign-up.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserMetadata {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub full_name: Option<String>,
    }

    /// Account as returned by the identity provider.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct User {
        pub id: Uuid,
        #[serde(default)]
        pub email: Option<String>,
        #[serde(default)]
        pub user_metadata: UserMetadata,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AuthSession {
        pub access_token: String,
        pub refresh_token: String,
        #[serde(default)]
        pub token_type: Option<String>,
        #[serde(default)]
        pub expires_in: Option<i64>,
        /// Unix timestamp (seconds) after which the access token is rejected.
        #[serde(default)]
        pub expires_at: Option<i64>,
        pub user: User,
    }

    impl AuthSession {
        /// True when the access token expires within `margin_secs` of `now`.
        pub fn expires_within(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
            self.expires_at
                .is_some_and(|expires_at| expires_at - margin_secs <= now.timestamp())
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum AuthEventKind {
        SignedIn,
        SignedOut,
        TokenRefreshed,
        UserUpdated,
    }

    /// Session transition published by the identity provider.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct AuthEvent {
        pub kind: AuthEventKind,
        pub session: Option<AuthSession>,
    }

    /// Request body for `POST /auth/v1/signup`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignUp {
        pub email: String,
        pub password: String,
        pub data: UserMetadata,
    }

    /// Request body for `POST /auth/v1/token?grant_type=password`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PasswordGrant {
        pub email: String,
        pub password: String,
    }

    /// Request body for `POST /auth/v1/token?grant_type=refresh_token`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RefreshGrant {
        pub refresh_token: String,
    }

    /// Sign-up answers with a session when accounts are auto-confirmed and with
    /// the bare user when an e-mail confirmation is pending.
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum SignUpResponse {
        Session(AuthSession),
        User(User),
    }
}

#[cfg(test)]
mod tests {
    use super::{expense::Expense, reservation::*};

    #[test]
    fn legacy_pending_status_reads_as_reserved() {
        let status: ReservationStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, ReservationStatus::Reserved);
        assert_eq!(
            serde_json::to_string(&ReservationStatus::Reserved).unwrap(),
            "\"reserved\""
        );
    }

    #[test]
    fn reservation_row_with_string_price() {
        let row = r#"{
            "id": "5d1f6b8e-6a0e-4b61-9a1f-0e7d3c1b2a44",
            "user_id": "0b6f2f5c-3f7e-4d3a-8d41-5c7a9e0f1b22",
            "guest_name": "Rossi",
            "check_in": "2025-06-01",
            "check_out": "2025-06-04",
            "total_price": "300.50",
            "status": "confirmed",
            "notes": null,
            "created_at": "2025-05-20T10:00:00.123456+00:00"
        }"#;
        let reservation: Reservation = serde_json::from_str(row).unwrap();
        assert_eq!(reservation.total_price, 300.5);
        assert_eq!(reservation.notes, None);
    }

    #[test]
    fn expense_amount_defaults_to_zero() {
        let row = r#"{
            "id": "5d1f6b8e-6a0e-4b61-9a1f-0e7d3c1b2a44",
            "user_id": "0b6f2f5c-3f7e-4d3a-8d41-5c7a9e0f1b22",
            "description": "Pool cleaning",
            "amount": "n/a",
            "category": "maintenance",
            "date": "2025-06-02",
            "created_at": "2025-06-02T08:00:00Z"
        }"#;
        let expense: Expense = serde_json::from_str(row).unwrap();
        assert_eq!(expense.amount, 0.0);

        let missing = row.replace("\"amount\": \"n/a\",", "");
        let expense: Expense = serde_json::from_str(&missing).unwrap();
        assert_eq!(expense.amount, 0.0);

        let null = row.replace("\"n/a\"", "null");
        let expense: Expense = serde_json::from_str(&null).unwrap();
        assert_eq!(expense.amount, 0.0);
    }
}
