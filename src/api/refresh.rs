//! Single-flight token refresh coordination.
//!
//! Under a burst of concurrent requests, every one of them can discover the
//! expired access token at the same moment. Exactly one caller (the leader)
//! performs the refresh call; the rest park on a waiter queue and are
//! released in FIFO order once the refresh settles. A failed refresh ends
//! the session and fails every parked waiter, so no request is left hung
//! and none retries more than once.
//!
//! The `(state, waiter queue)` pair is the only shared mutable state. The
//! idle-to-refreshing check-and-transition, the refresh-token read, and
//! waiter enqueueing all happen inside a single lock acquisition, and the
//! lock is never held across an await point.

use std::mem;
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use tokio::sync::oneshot;

use super::transport::{RequestDescriptor, Transport, REFRESH_PATH, REFRESH_TIMEOUT};
use crate::auth::session::SessionTerminator;
use crate::auth::tokens::TokenStore;

/// The refresh settled in failure; callers surface the session as expired.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RefreshFailed;

type Waiter = oneshot::Sender<Result<String, RefreshFailed>>;

enum RefreshState {
    Idle,
    Refreshing { waiters: Vec<Waiter> },
}

/// What the caller drew when it hit the coordinator.
enum Role {
    /// First in: perform the refresh call with this refresh token.
    Lead { refresh_token: String },
    /// A refresh is already in flight: park until it settles.
    Join(oneshot::Receiver<Result<String, RefreshFailed>>),
    /// Nothing to refresh with: the session is over before any call.
    NoRefreshToken,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: Option<String>,
}

pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    store: Arc<dyn TokenStore>,
    transport: Arc<dyn Transport>,
    session: Arc<SessionTerminator>,
}

impl RefreshCoordinator {
    pub(crate) fn new(
        store: Arc<dyn TokenStore>,
        transport: Arc<dyn Transport>,
        session: Arc<SessionTerminator>,
    ) -> Self {
        Self {
            state: Mutex::new(RefreshState::Idle),
            store,
            transport,
            session,
        }
    }

    /// Called after a recoverable 401. Resolves with a fresh access token
    /// once a refresh (ours, or one already in flight) succeeds; the caller
    /// then retries its request exactly once.
    pub(crate) async fn refreshed_token(&self) -> Result<String, RefreshFailed> {
        let role = {
            let mut state = self.state.lock().expect("refresh state lock");
            match &mut *state {
                RefreshState::Refreshing { waiters } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Role::Join(rx)
                }
                RefreshState::Idle => match self.store.refresh_token() {
                    Some(refresh_token) => {
                        *state = RefreshState::Refreshing {
                            waiters: Vec::new(),
                        };
                        Role::Lead { refresh_token }
                    }
                    None => Role::NoRefreshToken,
                },
            }
        };

        match role {
            Role::NoRefreshToken => {
                tracing::warn!("Access token rejected and no refresh token stored");
                self.session.terminate();
                Err(RefreshFailed)
            }
            // A dropped sender means the leader went away; treat as failure.
            Role::Join(rx) => rx.await.unwrap_or(Err(RefreshFailed)),
            Role::Lead { refresh_token } => {
                let outcome = self.run_refresh(&refresh_token).await;
                self.settle(outcome)
            }
        }
    }

    /// Issue the one outstanding refresh call, on its own short budget so a
    /// congested request pool cannot starve it. On success the new pair is
    /// written to the store before any waiter is released.
    async fn run_refresh(&self, refresh_token: &str) -> Result<String, RefreshFailed> {
        tracing::info!("Access token rejected, refreshing...");

        let req = RequestDescriptor::post(
            REFRESH_PATH,
            serde_json::json!({ "refreshToken": refresh_token }),
        );
        let resp = match self.transport.send(&req, REFRESH_TIMEOUT).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                return Err(RefreshFailed);
            }
        };

        if !resp.status.is_success() {
            tracing::warn!("Token refresh rejected: HTTP {}", resp.status.as_u16());
            return Err(RefreshFailed);
        }

        let parsed: RefreshResponse = match resp.json() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Malformed refresh response: {}", e);
                return Err(RefreshFailed);
            }
        };

        self.store.set_token(parsed.token.clone());
        if let Some(rt) = parsed.refresh_token {
            self.store.set_refresh_token(rt);
        }

        tracing::info!("Token refreshed");
        Ok(parsed.token)
    }

    /// Return to idle and drain the waiter queue in FIFO order. On failure
    /// the session is terminated before any waiter is released, so every
    /// waiter observes cleared credentials.
    fn settle(&self, outcome: Result<String, RefreshFailed>) -> Result<String, RefreshFailed> {
        let waiters = {
            let mut state = self.state.lock().expect("refresh state lock");
            match mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing { waiters } => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };

        match outcome {
            Ok(token) => {
                for waiter in waiters {
                    // A waiter that lost interest just drops its receiver.
                    let _ = waiter.send(Ok(token.clone()));
                }
                Ok(token)
            }
            Err(RefreshFailed) => {
                self.session.terminate();
                for waiter in waiters {
                    let _ = waiter.send(Err(RefreshFailed));
                }
                Err(RefreshFailed)
            }
        }
    }
}
