//! Contract with the hosted identity provider.

use std::future::Future;

use api_types::auth::{AuthEvent, AuthSession, User, UserMetadata};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::ResultEngine;

/// Account management and session ownership.
///
/// Implementations own the session lifetime entirely: token storage, refresh
/// and expiry. Every session transition is published to the receivers handed
/// out by [`subscribe`](IdentityProvider::subscribe).
pub trait IdentityProvider: Send + Sync {
    /// Current session, refreshed if the implementation deems it necessary.
    fn get_session(&self) -> impl Future<Output = ResultEngine<Option<AuthSession>>> + Send;

    /// Register a new account. `None` means the account exists but must be
    /// confirmed by e-mail before it can sign in.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: UserMetadata,
    ) -> impl Future<Output = ResultEngine<Option<AuthSession>>> + Send;

    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = ResultEngine<AuthSession>> + Send;

    fn sign_out(&self) -> impl Future<Output = ResultEngine<()>> + Send;

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// The authenticated identity as seen by the application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl Principal {
    /// Name shown in greetings: full name, then e-mail, then the raw id.
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or(self.email.as_deref())
            .map(ToString::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.user_metadata.full_name.clone(),
        }
    }
}

/// Result of a sign-up request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(Principal),
    ConfirmationRequired,
}
