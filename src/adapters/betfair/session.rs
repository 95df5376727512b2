//! Exchange session token with single-flight renewal.
//!
//! One token per client instance. The mutex is held across the freshness
//! check *and* the login, so concurrent callers that find the token stale
//! wait for the single in-flight login and then reuse its token.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::ports::ClientResult;

/// A session token and the instant it stops being trusted.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    expires_at: Instant,
}

impl Session {
    fn new(token: String, ttl: Duration) -> Self {
        Self {
            token,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Lazily renewed session shared by every request of one client.
#[derive(Debug)]
pub struct SessionManager {
    ttl: Duration,
    state: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(None),
        }
    }

    /// Return a fresh token, running `login` only if none is cached.
    ///
    /// A failed login caches nothing; the next caller tries again.
    pub async fn token<F, Fut>(&self, login: F) -> ClientResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<String>>,
    {
        let mut guard = self.state.lock().await;
        if let Some(session) = guard.as_ref().filter(|s| s.is_fresh()) {
            return Ok(session.token.clone());
        }

        debug!(had_session = guard.is_some(), "Session stale or absent, logging in");
        let token = login().await?;
        *guard = Some(Session::new(token.clone(), self.ttl));
        info!(ttl_secs = self.ttl.as_secs(), "Exchange session established");
        Ok(token)
    }

    /// Drop the cached token so the next call logs in again.
    pub async fn invalidate(&self) {
        *self.state.lock().await = None;
    }

    /// True when a non-expired token is cached.
    pub async fn is_active(&self) -> bool {
        self.state.lock().await.as_ref().is_some_and(Session::is_fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ClientError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counting_login(counter: Arc<AtomicUsize>) -> ClientResult<String> {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(format!("token-{n}"))
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_login() {
        let manager = Arc::new(SessionManager::new(Duration::from_secs(900)));
        let logins = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let manager = Arc::clone(&manager);
            let logins = Arc::clone(&logins);
            handles.push(tokio::spawn(async move {
                manager.token(|| counting_login(logins)).await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "token-1");
        }
        assert_eq!(logins.load(Ordering::SeqCst), 1);
        assert!(manager.is_active().await);
    }

    #[tokio::test]
    async fn test_expired_token_is_renewed() {
        let manager = SessionManager::new(Duration::ZERO);
        let logins = Arc::new(AtomicUsize::new(0));

        let first = manager.token(|| counting_login(Arc::clone(&logins))).await.unwrap();
        let second = manager.token(|| counting_login(Arc::clone(&logins))).await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(second, "token-2");
        assert!(!manager.is_active().await);
    }

    #[tokio::test]
    async fn test_failed_login_is_not_cached() {
        let manager = SessionManager::new(Duration::from_secs(900));

        let err = manager
            .token(|| async { Err(ClientError::Auth("INVALID_USERNAME_OR_PASSWORD".into())) })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "auth");
        assert!(!manager.is_active().await);

        let token = manager.token(|| async { Ok("recovered".to_string()) }).await.unwrap();
        assert_eq!(token, "recovered");
    }

    #[tokio::test]
    async fn test_invalidate_forces_relogin() {
        let manager = SessionManager::new(Duration::from_secs(900));
        let logins = Arc::new(AtomicUsize::new(0));

        manager.token(|| counting_login(Arc::clone(&logins))).await.unwrap();
        manager.invalidate().await;
        let token = manager.token(|| counting_login(Arc::clone(&logins))).await.unwrap();

        assert_eq!(token, "token-2");
        assert_eq!(logins.load(Ordering::SeqCst), 2);
    }
}
