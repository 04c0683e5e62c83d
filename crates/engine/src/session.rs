//! Current-user state driven by the identity provider.
//!
//! A [`Session`] is the single observable source of "who is signed in". It
//! registers with the provider's session-change feed when created and
//! republishes every transition through a `watch` channel, so views hold a
//! receiver instead of reading a global.

use std::sync::Arc;

use api_types::auth::{AuthEvent, UserMetadata};
use tokio::sync::{broadcast, watch};

use crate::{
    EngineError, ResultEngine,
    provider::{IdentityProvider, Principal, SignUpOutcome},
    util::normalize_required_text,
};

/// Snapshot published to session subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub principal: Option<Principal>,
    /// True until the initial session lookup has completed.
    pub loading: bool,
}

impl SessionState {
    pub fn resolving() -> Self {
        Self {
            principal: None,
            loading: true,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.principal.is_some()
    }
}

pub struct Session<P> {
    provider: Arc<P>,
    events: broadcast::Receiver<AuthEvent>,
    state: watch::Sender<SessionState>,
}

impl<P: IdentityProvider> Session<P> {
    pub fn new(provider: Arc<P>) -> Self {
        let events = provider.subscribe();
        let (state, _) = watch::channel(SessionState::resolving());
        Self {
            provider,
            events,
            state,
        }
    }

    /// Register a listener. It observes every state published from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.state.borrow().principal.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Initial session lookup.
    ///
    /// A provider failure is logged and leaves the session signed out.
    pub async fn resolve(&mut self) {
        let principal = match self.provider.get_session().await {
            Ok(session) => session.map(|session| Principal::from(&session.user)),
            Err(err) => {
                tracing::warn!("failed to resolve the initial session: {err}");
                None
            }
        };
        self.pump();
        self.publish(principal);
    }

    /// Apply every pending provider event without waiting.
    ///
    /// Returns how many events were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.apply(&event);
                    applied += 1;
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session events lagged behind");
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => break,
            }
        }
        applied
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> ResultEngine<Principal> {
        let (email, password) = credentials(email, password)?;
        let session = self
            .provider
            .sign_in_with_password(&email, &password)
            .await?;
        let principal = Principal::from(&session.user);

        self.pump();
        self.publish(Some(principal.clone()));
        Ok(principal)
    }

    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> ResultEngine<SignUpOutcome> {
        let full_name = normalize_required_text(full_name, "Full name is required")?;
        let (email, password) = credentials(email, password)?;
        let metadata = UserMetadata {
            full_name: Some(full_name),
        };

        let outcome = match self.provider.sign_up(&email, &password, metadata).await? {
            Some(session) => {
                let principal = Principal::from(&session.user);
                self.pump();
                self.publish(Some(principal.clone()));
                SignUpOutcome::SignedIn(principal)
            }
            None => SignUpOutcome::ConfirmationRequired,
        };
        Ok(outcome)
    }

    pub async fn sign_out(&mut self) -> ResultEngine<()> {
        self.provider.sign_out().await?;
        self.pump();
        self.publish(None);
        Ok(())
    }

    fn apply(&self, event: &AuthEvent) {
        tracing::info!(kind = ?event.kind, "session changed");
        let principal = event
            .session
            .as_ref()
            .map(|session| Principal::from(&session.user));
        self.publish(principal);
    }

    fn publish(&self, principal: Option<Principal>) {
        let next = SessionState {
            principal,
            loading: false,
        };
        self.state.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
    }
}

fn credentials(email: &str, password: &str) -> ResultEngine<(String, String)> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(EngineError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    Ok((email.to_string(), password.to_string()))
}
