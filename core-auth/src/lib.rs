//! # Authentication Module
//!
//! Supplies bearer tokens for outbound upload requests.
//!
//! ## Overview
//!
//! The host owns sign-in and credential refresh; it exposes them through the
//! [`IdentityProvider`] trait. [`AuthTokenProvider`] wraps that provider with
//! a bounded wait so the upload controller never stalls on a slow credential
//! subsystem:
//!
//! - [`AuthTokenProvider::get_token`] for async callers
//! - [`AuthTokenProvider::get_token_blocking`] for synchronous host threads
//!
//! Both return `None` on no signed-in user, fetch failure or timeout. Tokens
//! are never cached; each invocation fetches a fresh one.

pub mod error;
pub mod provider;
pub mod types;

pub use error::{AuthError, Result};
pub use provider::{AuthTokenProvider, IdentityProvider};
pub use types::{AuthToken, UserId};
