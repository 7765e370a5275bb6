//! Authenticated HTTP client for the Parish Portal API.
//!
//! Wraps the transport with token injection, failed-response classification,
//! and transparent single-flight token refresh: a request that hits a 401 is
//! retried exactly once after the (shared) refresh completes, or fails as an
//! expired session.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::error::{classify, ApiError, Classification};
use super::refresh::{RefreshCoordinator, RefreshFailed};
use super::transport::{
    HttpTransport, RequestDescriptor, Transport, TransportResponse, REQUEST_TIMEOUT,
};
use crate::auth::session::{CliHooks, SessionHooks, SessionTerminator};
use crate::auth::tokens::TokenStore;
use crate::config::{Config, ConfigTokenStore};

/// One outbound call and its refresh-retry budget. A request joins at most
/// one refresh cycle; a second 401 after the retry is final.
struct RequestAttempt {
    request: RequestDescriptor,
    retried_after_refresh: bool,
}

/// Authenticated portal client.
pub struct PortalClient {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    session: Arc<SessionTerminator>,
    refresh: RefreshCoordinator,
}

impl PortalClient {
    /// Load config and build a client against the configured portal.
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        if config.access_token.is_none() && config.refresh_token.is_none() {
            anyhow::bail!("Not signed in. Run 'parish-cli login' first.");
        }
        let base_url = config.portal_url();
        let store: Arc<dyn TokenStore> = Arc::new(ConfigTokenStore::new(config));
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(base_url));
        Ok(Self::assemble(transport, store, Arc::new(CliHooks)))
    }

    /// Assemble from parts. Tests substitute a scripted transport here.
    pub fn assemble(
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        hooks: Arc<dyn SessionHooks>,
    ) -> Self {
        let session = Arc::new(SessionTerminator::new(store.clone(), hooks));
        let refresh = RefreshCoordinator::new(store.clone(), transport.clone(), session.clone());
        Self {
            transport,
            store,
            session,
            refresh,
        }
    }

    /// GET returning deserialized JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.request(RequestDescriptor::get(path)).await?;
        resp.json()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// POST returning deserialized JSON.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let resp = self.request(RequestDescriptor::post(path, body)).await?;
        resp.json()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Perform a request with bearer injection and at most one
    /// refresh-driven retry.
    pub async fn request(&self, request: RequestDescriptor) -> Result<TransportResponse, ApiError> {
        let mut attempt = RequestAttempt {
            request,
            retried_after_refresh: false,
        };

        loop {
            // Request interceptor: the current access token, if any, rides
            // along as a bearer credential.
            let mut req = attempt.request.clone();
            req.bearer = self.store.token();
            tracing::debug!("{} {}", req.method, req.path);

            let resp = self.transport.send(&req, REQUEST_TIMEOUT).await?;
            if resp.status.is_success() {
                return Ok(resp);
            }

            match classify(
                resp.status,
                req.is_refresh_call(),
                attempt.retried_after_refresh,
            ) {
                Classification::UnauthorizedRecoverable => {
                    // Start a refresh or join the one in flight; the new
                    // token lands in the store before this resolves.
                    match self.refresh.refreshed_token().await {
                        Ok(_) => {
                            attempt.retried_after_refresh = true;
                            continue;
                        }
                        Err(RefreshFailed) => return Err(ApiError::SessionExpired),
                    }
                }
                Classification::UnauthorizedIrrecoverable => {
                    self.session.terminate();
                    return Err(ApiError::SessionExpired);
                }
                Classification::RateLimited => {
                    return Err(ApiError::RateLimited { body: resp.body });
                }
                Classification::Maintenance => {
                    self.session.maintenance();
                    return Err(ApiError::Maintenance);
                }
                Classification::Other => {
                    return Err(ApiError::Http {
                        status: resp.status.as_u16(),
                        body: resp.body,
                    });
                }
            }
        }
    }
}

/// Convenience wrapper for command functions: build the default client with
/// a consistent error message.
pub fn connect() -> Result<PortalClient> {
    PortalClient::new().context("Failed to build portal client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::testing::{MockTransport, RefreshScript};
    use crate::api::transport::TransportError;
    use crate::auth::session::testing::CountingHooks;
    use crate::auth::tokens::MemoryTokenStore;
    use futures::future::join_all;
    use std::sync::atomic::Ordering;

    struct Harness {
        client: PortalClient,
        transport: Arc<MockTransport>,
        store: Arc<MemoryTokenStore>,
        hooks: Arc<CountingHooks>,
    }

    /// Client over a scripted portal. The store starts with ("T1", "R1");
    /// whether "T1" is accepted depends on `valid_token`.
    fn harness(valid_token: Option<&str>, script: RefreshScript) -> Harness {
        let transport = Arc::new(MockTransport::new(valid_token, script));
        let store = Arc::new(MemoryTokenStore::with_tokens("T1", "R1"));
        let hooks = Arc::new(CountingHooks::default());
        let client = PortalClient::assemble(transport.clone(), store.clone(), hooks.clone());
        Harness {
            client,
            transport,
            store,
            hooks,
        }
    }

    fn issue(token: &str, refresh_token: Option<&str>) -> RefreshScript {
        RefreshScript::Issue {
            token: token.to_string(),
            refresh_token: refresh_token.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_success_passes_through_untouched() {
        let h = harness(Some("T1"), issue("T2", Some("R2")));

        let resp = h.client.request(RequestDescriptor::get("/events")).await;
        assert!(resp.is_ok());
        assert_eq!(h.transport.refresh_calls.load(Ordering::SeqCst), 0);
        // Store unchanged
        assert_eq!(h.store.token().as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn test_single_flight_refresh_for_concurrent_bursts() {
        for n in [1usize, 5, 50] {
            let h = harness(Some("T2"), issue("T2", Some("R2")));

            let calls = (0..n).map(|_| h.client.request(RequestDescriptor::get("/events")));
            let results = join_all(calls).await;

            assert!(results.iter().all(Result::is_ok), "n={}", n);
            assert_eq!(
                h.transport.refresh_calls.load(Ordering::SeqCst),
                1,
                "exactly one refresh call for {} concurrent 401s",
                n
            );

            // Every request was re-issued carrying the fresh token
            let log = h.transport.logged_paths();
            assert_eq!(log.len(), 2 * n, "n={}", n);
            let retries = log
                .iter()
                .filter(|(_, bearer)| bearer.as_deref() == Some("T2"))
                .count();
            assert_eq!(retries, n, "n={}", n);
        }
    }

    #[tokio::test]
    async fn test_waiters_reissued_in_fifo_order() {
        let h = harness(Some("T2"), issue("T2", Some("R2")));

        let r1 = h.client.request(RequestDescriptor::get("/r1"));
        let r2 = h.client.request(RequestDescriptor::get("/r2"));
        let r3 = h.client.request(RequestDescriptor::get("/r3"));
        let results = join_all([r1, r2, r3]).await;
        assert!(results.iter().all(Result::is_ok));

        let reissued: Vec<String> = h
            .transport
            .logged_paths()
            .into_iter()
            .filter(|(_, bearer)| bearer.as_deref() == Some("T2"))
            .map(|(path, _)| path)
            .collect();
        assert_eq!(reissued, ["/r1", "/r2", "/r3"]);
    }

    #[tokio::test]
    async fn test_refresh_scenario_rotates_both_tokens() {
        let h = harness(Some("T2"), issue("T2", Some("R2")));

        let calls = ["/a", "/b", "/c"]
            .into_iter()
            .map(|path| h.client.request(RequestDescriptor::get(path)));
        let results = join_all(calls).await;
        assert!(results.iter().all(Result::is_ok));

        // One refresh POST carrying the old refresh token
        let bodies = h.transport.refresh_bodies.lock().expect("mock lock").clone();
        assert_eq!(bodies, [serde_json::json!({ "refreshToken": "R1" })]);

        // Store ends with the rotated pair
        assert_eq!(h.store.token().as_deref(), Some("T2"));
        assert_eq!(h.store.refresh_token().as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn test_missing_refresh_token_in_response_keeps_old() {
        let h = harness(Some("T2"), issue("T2", None));

        let resp = h.client.request(RequestDescriptor::get("/events")).await;
        assert!(resp.is_ok());
        assert_eq!(h.store.token().as_deref(), Some("T2"));
        assert_eq!(h.store.refresh_token().as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn test_refresh_rejection_fails_all_waiters_uniformly() {
        let h = harness(Some("T2"), RefreshScript::Status(401));

        let calls = (0..3).map(|_| h.client.request(RequestDescriptor::get("/events")));
        let results = join_all(calls).await;

        for result in results {
            assert!(matches!(result, Err(ApiError::SessionExpired)));
        }
        assert_eq!(h.transport.refresh_calls.load(Ordering::SeqCst), 1);
        // Credentials cleared, one sign-in redirect
        assert_eq!(h.store.token(), None);
        assert_eq!(h.store.refresh_token(), None);
        assert_eq!(h.hooks.logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_network_failure_terminates_session() {
        let h = harness(
            Some("T2"),
            RefreshScript::Fail(TransportError::Network("connection reset".into())),
        );

        let result = h.client.request(RequestDescriptor::get("/events")).await;
        assert!(matches!(result, Err(ApiError::SessionExpired)));
        assert_eq!(h.store.token(), None);
        assert_eq!(h.hooks.logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_refresh_response_is_failure() {
        // 200 but no "token" field
        let h = harness(Some("T2"), RefreshScript::Status(200));
        // Status(200) responds with "{}", which is missing the token field

        let result = h.client.request(RequestDescriptor::get("/events")).await;
        assert!(matches!(result, Err(ApiError::SessionExpired)));
        assert_eq!(h.store.token(), None);
    }

    #[tokio::test]
    async fn test_at_most_one_retry_per_request() {
        // Refresh "succeeds" but the portal keeps rejecting the new token
        let h = harness(None, issue("T2", Some("R2")));
        h.transport.rotate_valid.store(false, Ordering::SeqCst);

        let result = h.client.request(RequestDescriptor::get("/events")).await;
        assert!(matches!(result, Err(ApiError::SessionExpired)));

        // One refresh, one retry, no loop
        assert_eq!(h.transport.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.transport.logged_paths().len(), 2);
        assert_eq!(h.hooks.logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_stored_refresh_token_short_circuits() {
        let transport = Arc::new(MockTransport::new(None, issue("T2", None)));
        let store = Arc::new(MemoryTokenStore::new());
        store.set_token("T1".into());
        let hooks = Arc::new(CountingHooks::default());
        let client = PortalClient::assemble(transport.clone(), store.clone(), hooks.clone());

        let result = client.request(RequestDescriptor::get("/events")).await;
        assert!(matches!(result, Err(ApiError::SessionExpired)));
        // The refresh endpoint was never called
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.token(), None);
        assert_eq!(hooks.logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_coordinator_cycles_back_to_idle() {
        let h = harness(Some("T2"), issue("T2", Some("R2")));

        let first = h.client.request(RequestDescriptor::get("/events")).await;
        assert!(first.is_ok());
        assert_eq!(h.transport.refresh_calls.load(Ordering::SeqCst), 1);

        // The portal rotates again; the stored T2 goes stale
        *h.transport.valid_token.lock().expect("mock lock") = Some("T3".into());
        *h.transport.refresh_script.lock().expect("mock lock") = issue("T3", Some("R3"));

        let second = h.client.request(RequestDescriptor::get("/events")).await;
        assert!(second.is_ok());
        assert_eq!(h.transport.refresh_calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.store.token().as_deref(), Some("T3"));
    }

    #[tokio::test]
    async fn test_maintenance_is_terminal_with_one_redirect() {
        let h = harness(Some("T1"), issue("T2", None));
        h.transport.set_path_status("/events", 503);

        let first = h.client.request(RequestDescriptor::get("/events")).await;
        assert!(matches!(first, Err(ApiError::Maintenance)));
        let second = h.client.request(RequestDescriptor::get("/events")).await;
        assert!(matches!(second, Err(ApiError::Maintenance)));

        assert_eq!(h.hooks.maintenances.load(Ordering::SeqCst), 1);
        assert_eq!(h.transport.refresh_calls.load(Ordering::SeqCst), 0);
        // Session untouched
        assert_eq!(h.store.token().as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn test_rate_limit_surfaces_without_retry_or_teardown() {
        let h = harness(Some("T1"), issue("T2", None));
        h.transport.set_path_status("/donations", 429);

        let result = h.client.request(RequestDescriptor::get("/donations")).await;
        assert!(matches!(result, Err(ApiError::RateLimited { .. })));
        assert_eq!(h.transport.refresh_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.transport.logged_paths().len(), 1);
        assert_eq!(h.store.token().as_deref(), Some("T1"));
        assert_eq!(h.hooks.logins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_other_statuses_surface_unchanged() {
        let h = harness(Some("T1"), issue("T2", None));
        h.transport.set_path_status("/events", 500);

        let result = h.client.request(RequestDescriptor::get("/events")).await;
        match result {
            Err(ApiError::Http { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_does_not_touch_the_coordinator() {
        let h = harness(Some("T1"), issue("T2", None));
        h.transport.set_path_error("/events", TransportError::Timeout);

        let result = h.client.request(RequestDescriptor::get("/events")).await;
        assert!(matches!(result, Err(ApiError::Timeout)));
        assert_eq!(h.transport.refresh_calls.load(Ordering::SeqCst), 0);

        // The coordinator stayed idle and other paths are unaffected
        let ok = h.client.request(RequestDescriptor::get("/sermons")).await;
        assert!(ok.is_ok());
    }
}
