//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`Validation`] returned when user input is rejected before any network
//!   call is made.
//! - [`Unauthenticated`] returned when an operation needs a signed-in
//!   principal and there is none.
//! - [`Auth`] returned when the identity provider refuses a request.
//! - [`Store`] returned when the record store (or the transport to it) fails.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`Unauthenticated`]: EngineError::Unauthenticated
//!  [`Auth`]: EngineError::Auth
//!  [`Store`]: EngineError::Store
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("not signed in")]
    Unauthenticated,
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Store(String),
    #[error("configuration error: {0}")]
    Config(String),
}
