//! # Auth Token Provider
//!
//! Bridges the host's asynchronous credential subsystem to callers that can
//! only afford a bounded wait.
//!
//! Each request spawns one fetch task and races it against a timer. When the
//! timer wins, the task is aborted so no orphaned fetch keeps running on the
//! worker pool. Tokens are never cached, but one the host hands back already
//! past its expiry is refused. Failures of any kind collapse into `None` for
//! the controller, which simply skips discovery until the next invocation.

use crate::error::{AuthError, Result};
use crate::types::{AuthToken, UserId};
use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use core_async::runtime::Handle;
use core_async::task;
use core_async::time::{self, Duration};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Host identity service (e.g. Firebase Auth, a platform account manager)
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, if any. Must not block.
    fn current_user(&self) -> Option<UserId>;

    /// Fetch a fresh bearer token for `user`
    async fn fetch_token(&self, user: &UserId) -> BridgeResult<AuthToken>;
}

/// Bounded-wait token source for upload requests
#[derive(Clone)]
pub struct AuthTokenProvider {
    identity: Arc<dyn IdentityProvider>,
    event_bus: Option<EventBus>,
}

impl AuthTokenProvider {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            event_bus: None,
        }
    }

    /// Emit `AuthEvent::TokenUnavailable` on this bus whenever a token
    /// cannot be obtained
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.identity.current_user()
    }

    /// Fetch a token, waiting at most `timeout`.
    ///
    /// Returns `None` when nobody is signed in, the fetch fails, or the
    /// timeout elapses.
    pub async fn get_token(&self, timeout: Duration) -> Option<AuthToken> {
        let result = self.try_get_token(timeout).await;
        self.settle(result)
    }

    /// Like [`get_token`](Self::get_token) but reports why no token was returned.
    #[instrument(skip(self), fields(timeout_ms = timeout.as_millis() as u64))]
    pub async fn try_get_token(&self, timeout: Duration) -> Result<AuthToken> {
        let user = self
            .identity
            .current_user()
            .ok_or(AuthError::NotAuthenticated)?;

        let identity = Arc::clone(&self.identity);
        let fetch = task::spawn(async move { identity.fetch_token(&user).await });
        let abort = fetch.abort_handle();

        match time::timeout(timeout, fetch).await {
            Ok(Ok(result)) => result.map_err(|e| AuthError::TokenFetchFailed(e.to_string())),
            Ok(Err(join_error)) => Err(AuthError::TokenFetchFailed(join_error.to_string())),
            Err(_) => {
                abort.abort();
                Err(AuthError::Timeout {
                    timeout_ms: timeout.as_millis(),
                })
            }
        }
    }

    /// Fetch a token from a synchronous thread, waiting at most `timeout`.
    ///
    /// The fetch runs on `handle`'s worker pool while the calling thread
    /// blocks on a channel. Must not be called from inside an async task
    /// driven by the same runtime.
    pub fn get_token_blocking(&self, handle: &Handle, timeout: Duration) -> Option<AuthToken> {
        let result = self.try_get_token_blocking(handle, timeout);
        self.settle(result)
    }

    fn try_get_token_blocking(&self, handle: &Handle, timeout: Duration) -> Result<AuthToken> {
        let user = self
            .identity
            .current_user()
            .ok_or(AuthError::NotAuthenticated)?;

        let (tx, rx) = mpsc::sync_channel(1);
        let identity = Arc::clone(&self.identity);
        let fetch = handle.spawn(async move {
            let result = identity.fetch_token(&user).await;
            // Receiver is gone once the caller timed out
            tx.send(result).ok();
        });

        match rx.recv_timeout(timeout) {
            Ok(result) => result.map_err(|e| AuthError::TokenFetchFailed(e.to_string())),
            Err(RecvTimeoutError::Timeout) => {
                fetch.abort();
                Err(AuthError::Timeout {
                    timeout_ms: timeout.as_millis(),
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(AuthError::TokenFetchFailed(
                "token task ended without a result".to_string(),
            )),
        }
    }

    fn settle(&self, result: Result<AuthToken>) -> Option<AuthToken> {
        let result = result.and_then(|token| {
            if token.is_expired() {
                Err(AuthError::TokenExpired)
            } else {
                Ok(token)
            }
        });

        match result {
            Ok(token) => {
                debug!(target: "auth", token = ?token, "Auth token acquired");
                Some(token)
            }
            Err(err) => {
                warn!(target: "auth", error = %err, "Auth token unavailable");
                if let Some(bus) = &self.event_bus {
                    bus.emit(CoreEvent::Auth(AuthEvent::TokenUnavailable {
                        reason: err.to_string(),
                    }))
                    .ok();
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::BridgeError;
    use chrono::{Duration as ChronoDuration, Utc};
    use mockall::mock;

    mock! {
        Identity {}

        #[async_trait]
        impl IdentityProvider for Identity {
            fn current_user(&self) -> Option<UserId>;
            async fn fetch_token(&self, user: &UserId) -> BridgeResult<AuthToken>;
        }
    }

    /// Never answers within any reasonable timeout
    struct SlowIdentity;

    #[async_trait]
    impl IdentityProvider for SlowIdentity {
        fn current_user(&self) -> Option<UserId> {
            Some(UserId::new("uid"))
        }

        async fn fetch_token(&self, _user: &UserId) -> BridgeResult<AuthToken> {
            time::sleep(Duration::from_secs(30)).await;
            Ok(AuthToken::new("late"))
        }
    }

    fn signed_in(token: &'static str) -> MockIdentity {
        let mut identity = MockIdentity::new();
        identity
            .expect_current_user()
            .returning(|| Some(UserId::new("uid_1")));
        identity
            .expect_fetch_token()
            .withf(|user| user.as_str() == "uid_1")
            .times(1)
            .returning(move |_| Ok(AuthToken::new(token)));
        identity
    }

    #[core_async::test]
    async fn test_get_token_returns_fresh_token() {
        let provider = AuthTokenProvider::new(Arc::new(signed_in("tok")));

        let token = provider.get_token(Duration::from_secs(1)).await;

        assert_eq!(token.map(|t| t.secret().to_string()), Some("tok".to_string()));
    }

    #[core_async::test]
    async fn test_no_user_skips_fetch() {
        let mut identity = MockIdentity::new();
        identity.expect_current_user().returning(|| None);
        identity.expect_fetch_token().never();
        let provider = AuthTokenProvider::new(Arc::new(identity));

        assert!(matches!(
            provider.try_get_token(Duration::from_secs(1)).await,
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[core_async::test]
    async fn test_fetch_error_becomes_none_and_emits_event() {
        let mut identity = MockIdentity::new();
        identity
            .expect_current_user()
            .returning(|| Some(UserId::new("uid_1")));
        identity
            .expect_fetch_token()
            .returning(|_| Err(BridgeError::OperationFailed("offline".to_string())));

        let bus = EventBus::new(4);
        let mut events = bus.subscribe();
        let provider = AuthTokenProvider::new(Arc::new(identity)).with_event_bus(bus);

        assert!(provider.get_token(Duration::from_secs(1)).await.is_none());

        match events.try_recv().unwrap() {
            CoreEvent::Auth(AuthEvent::TokenUnavailable { reason }) => {
                assert!(reason.contains("offline"))
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[core_async::test]
    async fn test_expired_token_is_refused() {
        let mut identity = MockIdentity::new();
        identity
            .expect_current_user()
            .returning(|| Some(UserId::new("uid_1")));
        identity.expect_fetch_token().returning(|_| {
            Ok(AuthToken::new("stale").with_expiry(Utc::now() - ChronoDuration::seconds(5)))
        });

        let bus = EventBus::new(4);
        let mut events = bus.subscribe();
        let provider = AuthTokenProvider::new(Arc::new(identity)).with_event_bus(bus);

        assert!(provider.get_token(Duration::from_secs(1)).await.is_none());
        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::TokenUnavailable { .. })
        ));
    }

    #[core_async::test]
    async fn test_token_with_future_expiry_is_returned() {
        let mut identity = MockIdentity::new();
        identity
            .expect_current_user()
            .returning(|| Some(UserId::new("uid_1")));
        identity.expect_fetch_token().returning(|_| {
            Ok(AuthToken::new("fresh").with_expiry(Utc::now() + ChronoDuration::minutes(30)))
        });
        let provider = AuthTokenProvider::new(Arc::new(identity));

        let token = provider.get_token(Duration::from_secs(1)).await;

        assert_eq!(token.unwrap().secret(), "fresh");
    }

    #[core_async::test]
    async fn test_timeout_returns_none() {
        let provider = AuthTokenProvider::new(Arc::new(SlowIdentity));

        let started = time::Instant::now();
        let result = provider.try_get_token(Duration::from_millis(50)).await;

        assert!(matches!(result, Err(AuthError::Timeout { timeout_ms: 50 })));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_blocking_bridge_returns_token() {
        let runtime = core_async::runtime::build_worker_pool(1, "auth-test").unwrap();
        let provider = AuthTokenProvider::new(Arc::new(signed_in("blocking")));

        let token = provider.get_token_blocking(runtime.handle(), Duration::from_secs(1));

        assert_eq!(token.unwrap().secret(), "blocking");
    }

    #[test]
    fn test_blocking_bridge_times_out() {
        let runtime = core_async::runtime::build_worker_pool(1, "auth-test").unwrap();
        let provider = AuthTokenProvider::new(Arc::new(SlowIdentity));

        let started = std::time::Instant::now();
        let token = provider.get_token_blocking(runtime.handle(), Duration::from_millis(50));

        assert!(token.is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
