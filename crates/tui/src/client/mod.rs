use api_types::auth::{
    AuthEvent, AuthEventKind, AuthSession, PasswordGrant, RefreshGrant, SignUp, SignUpResponse,
    UserMetadata,
};
use chrono::Utc;
use engine::{EngineError, IdentityProvider, Query, RecordStore, ResultEngine, Table};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Refresh the access token when it expires within this many seconds.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Server(String),
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    fn into_auth(self) -> EngineError {
        EngineError::Auth(self.to_string())
    }

    fn into_store(self) -> EngineError {
        EngineError::Store(self.to_string())
    }
}

/// Error bodies differ between the identity and the table endpoints; take
/// whichever message field is present.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorResponse {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorResponse {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
            .filter(|message| !message.trim().is_empty())
    }
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(body)
        .ok()
        .and_then(ErrorResponse::into_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(ToString::to_string)
                .unwrap_or_else(|| status.to_string())
        })
}

fn classify(status: StatusCode, message: String) -> ClientError {
    match status.as_u16() {
        401 => ClientError::Unauthorized(message),
        403 => ClientError::Forbidden(message),
        404 => ClientError::NotFound(message),
        409 => ClientError::Conflict(message),
        400 | 422 => ClientError::Validation(message),
        _ => ClientError::Server(message),
    }
}

async fn check(res: Response) -> std::result::Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.bytes().await?;
    Err(classify(status, error_message(status, &body)))
}

/// Fill in `expires_at` when the provider only sent `expires_in`.
fn stamp_expiry(mut session: AuthSession) -> AuthSession {
    if session.expires_at.is_none() {
        session.expires_at = session
            .expires_in
            .map(|expires_in| Utc::now().timestamp() + expires_in);
    }
    session
}

/// Client for the hosted identity (`/auth/v1`) and table (`/rest/v1`) APIs.
///
/// The session lives here and nowhere else; the table calls borrow its
/// access token and fall back to the anon key when signed out.
#[derive(Debug)]
pub struct HostedBackend {
    base_url: Url,
    anon_key: String,
    http: reqwest::Client,
    session: RwLock<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
}

impl HostedBackend {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url)
            .map_err(|err| AppError::Setting(format!("invalid base_url: {err}")))?;
        let (events, _) = broadcast::channel(16);

        Ok(Self {
            base_url,
            anon_key: anon_key.to_string(),
            http: reqwest::Client::builder().build()?,
            session: RwLock::new(None),
            events,
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid endpoint {path}: {err}")))
    }

    fn request(
        &self,
        method: Method,
        url: Url,
        access_token: Option<&str>,
    ) -> RequestBuilder {
        let bearer = access_token.unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn emit(&self, kind: AuthEventKind, session: Option<AuthSession>) {
        let _ = self.events.send(AuthEvent { kind, session });
    }

    async fn token_grant<B: serde::Serialize>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> std::result::Result<AuthSession, ClientError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let res = self
            .request(Method::POST, url, None)
            .json(body)
            .send()
            .await?;
        let session = check(res).await?.json::<AuthSession>().await?;
        Ok(stamp_expiry(session))
    }

    /// The held session, refreshed first when it is about to expire.
    ///
    /// A failed refresh ends the session.
    async fn current_session(&self) -> Option<AuthSession> {
        let held = self.session.read().await.clone()?;
        if !held.expires_within(Utc::now(), REFRESH_MARGIN_SECS) {
            return Some(held);
        }

        let grant = RefreshGrant {
            refresh_token: held.refresh_token.clone(),
        };
        match self.token_grant("refresh_token", &grant).await {
            Ok(session) => {
                *self.session.write().await = Some(session.clone());
                tracing::debug!("access token refreshed");
                self.emit(AuthEventKind::TokenRefreshed, Some(session.clone()));
                Some(session)
            }
            Err(err) => {
                tracing::warn!("token refresh failed, signing out: {err}");
                *self.session.write().await = None;
                self.emit(AuthEventKind::SignedOut, None);
                None
            }
        }
    }

    async fn access_token(&self) -> Option<String> {
        self.current_session()
            .await
            .map(|session| session.access_token)
    }

    fn table_url(&self, table: &str) -> std::result::Result<Url, ClientError> {
        self.endpoint(&format!("rest/v1/{table}"))
    }

    fn id_filter(id: Uuid) -> [(&'static str, String); 1] {
        [("id", format!("eq.{id}"))]
    }
}

impl IdentityProvider for HostedBackend {
    async fn get_session(&self) -> ResultEngine<Option<AuthSession>> {
        Ok(self.current_session().await)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: UserMetadata,
    ) -> ResultEngine<Option<AuthSession>> {
        let body = SignUp {
            email: email.to_string(),
            password: password.to_string(),
            data: metadata,
        };
        let url = self.endpoint("auth/v1/signup").map_err(ClientError::into_auth)?;
        let res = self
            .request(Method::POST, url, None)
            .json(&body)
            .send()
            .await
            .map_err(|err| ClientError::from(err).into_auth())?;
        let res = check(res).await.map_err(ClientError::into_auth)?;
        let response = res
            .json::<SignUpResponse>()
            .await
            .map_err(|err| ClientError::from(err).into_auth())?;

        match response {
            SignUpResponse::Session(session) => {
                let session = stamp_expiry(session);
                *self.session.write().await = Some(session.clone());
                tracing::info!("signed up and signed in");
                self.emit(AuthEventKind::SignedIn, Some(session.clone()));
                Ok(Some(session))
            }
            SignUpResponse::User(user) => {
                tracing::info!(user = %user.id, "sign-up awaiting e-mail confirmation");
                Ok(None)
            }
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ResultEngine<AuthSession> {
        let grant = PasswordGrant {
            email: email.to_string(),
            password: password.to_string(),
        };
        let session = self
            .token_grant("password", &grant)
            .await
            .map_err(ClientError::into_auth)?;

        *self.session.write().await = Some(session.clone());
        self.emit(AuthEventKind::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> ResultEngine<()> {
        let held = self.session.write().await.take();
        if let Some(session) = held {
            let outcome = match self.endpoint("auth/v1/logout") {
                Ok(url) => self
                    .request(Method::POST, url, Some(&session.access_token))
                    .send()
                    .await
                    .map_err(ClientError::from),
                Err(err) => Err(err),
            };
            // The local session is gone either way.
            match outcome {
                Ok(res) => {
                    if let Err(err) = check(res).await {
                        tracing::warn!("logout rejected: {err}");
                    }
                }
                Err(err) => tracing::warn!("logout request failed: {err}"),
            }
        }

        self.emit(AuthEventKind::SignedOut, None);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

fn select_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    if let Some(order) = query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    for (column, value) in &query.filters {
        params.push((column.to_string(), format!("eq.{value}")));
    }
    params
}

impl RecordStore for HostedBackend {
    async fn select<T: Table>(&self, query: &Query) -> ResultEngine<Vec<T::Row>> {
        let token = self.access_token().await;
        let url = self.table_url(T::NAME).map_err(ClientError::into_store)?;
        let res = self
            .request(Method::GET, url, token.as_deref())
            .query(&select_params(query))
            .send()
            .await
            .map_err(|err| ClientError::from(err).into_store())?;
        let res = check(res).await.map_err(ClientError::into_store)?;
        res.json::<Vec<T::Row>>()
            .await
            .map_err(|err| ClientError::from(err).into_store())
    }

    async fn insert<T: Table>(&self, record: &T::New) -> ResultEngine<()> {
        let token = self.access_token().await;
        let url = self.table_url(T::NAME).map_err(ClientError::into_store)?;
        let res = self
            .request(Method::POST, url, token.as_deref())
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await
            .map_err(|err| ClientError::from(err).into_store())?;
        check(res).await.map_err(ClientError::into_store)?;
        Ok(())
    }

    async fn update<T: Table>(&self, id: Uuid, patch: &T::Patch) -> ResultEngine<()> {
        let token = self.access_token().await;
        let url = self.table_url(T::NAME).map_err(ClientError::into_store)?;
        let res = self
            .request(Method::PATCH, url, token.as_deref())
            .query(&Self::id_filter(id))
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await
            .map_err(|err| ClientError::from(err).into_store())?;
        check(res).await.map_err(ClientError::into_store)?;
        Ok(())
    }

    async fn delete<T: Table>(&self, id: Uuid) -> ResultEngine<()> {
        let token = self.access_token().await;
        let url = self.table_url(T::NAME).map_err(ClientError::into_store)?;
        let res = self
            .request(Method::DELETE, url, token.as_deref())
            .query(&Self::id_filter(id))
            .send()
            .await
            .map_err(|err| ClientError::from(err).into_store())?;
        check(res).await.map_err(ClientError::into_store)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_body_fields() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(
            error_message(status, br#"{"error_description":"Invalid login credentials","error":"invalid_grant"}"#),
            "Invalid login credentials"
        );
        assert_eq!(
            error_message(status, br#"{"msg":"User already registered"}"#),
            "User already registered"
        );
        assert_eq!(
            error_message(status, br#"{"message":"new row violates row-level security policy"}"#),
            "new row violates row-level security policy"
        );
    }

    #[test]
    fn error_message_falls_back_to_status_text() {
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, b"<html>down</html>"),
            "Service Unavailable"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, br#"{"message":"  "}"#),
            "Internal Server Error"
        );
    }

    #[test]
    fn status_codes_map_to_client_errors() {
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, String::new()),
            ClientError::Unauthorized(_)
        ));
        assert!(matches!(
            classify(StatusCode::UNPROCESSABLE_ENTITY, String::new()),
            ClientError::Validation(_)
        ));
        assert!(matches!(
            classify(StatusCode::BAD_GATEWAY, String::new()),
            ClientError::Server(_)
        ));
    }

    #[test]
    fn select_params_follow_the_table_api_syntax() {
        let query = Query::new().descending("check_in").eq("status", "confirmed");
        assert_eq!(
            select_params(&query),
            vec![
                ("select".to_string(), "*".to_string()),
                ("order".to_string(), "check_in.desc".to_string()),
                ("status".to_string(), "eq.confirmed".to_string()),
            ]
        );
    }

    #[test]
    fn endpoints_keep_the_project_path() {
        let backend = HostedBackend::new("https://example.test/project", "anon").unwrap();
        assert_eq!(
            backend.table_url("reservations").unwrap().as_str(),
            "https://example.test/project/rest/v1/reservations"
        );
    }

    #[test]
    fn expiry_is_stamped_from_expires_in() {
        let session: AuthSession = serde_json::from_str(
            r#"{
                "access_token": "a",
                "refresh_token": "r",
                "expires_in": 3600,
                "user": {"id": "0b6f2f5c-3f7e-4d3a-8d41-5c7a9e0f1b22"}
            }"#,
        )
        .unwrap();
        let session = stamp_expiry(session);
        assert!(session.expires_at.is_some());
        assert!(!session.expires_within(Utc::now(), REFRESH_MARGIN_SECS));
    }
}
