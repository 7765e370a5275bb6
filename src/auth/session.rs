//! Session teardown and host redirect signaling.
//!
//! When the refresh token itself is rejected there is nothing left to retry:
//! credentials are cleared and the host is pointed at the sign-in entry
//! point, once. A 503 similarly triggers a one-time maintenance notice.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::tokens::TokenStore;

/// Host-side redirect targets. The client core only signals; where "sign-in"
/// or "maintenance" actually lives is the host's concern.
pub trait SessionHooks: Send + Sync {
    fn goto_login(&self);
    fn goto_maintenance(&self);
}

/// Default hooks for the CLI: tell the user where to go.
pub struct CliHooks;

impl SessionHooks for CliHooks {
    fn goto_login(&self) {
        eprintln!("Session ended. Run 'parish-cli login' to sign in again.");
    }

    fn goto_maintenance(&self) {
        eprintln!("The portal is down for maintenance. Please try again later.");
    }
}

/// Clears credentials and fires the sign-in redirect at most once per
/// session. Repeated calls while already signed out are no-ops, so two
/// independently failing requests cannot loop the host through navigation.
pub struct SessionTerminator {
    store: Arc<dyn TokenStore>,
    hooks: Arc<dyn SessionHooks>,
    signed_out: AtomicBool,
    maintenance_seen: AtomicBool,
}

impl SessionTerminator {
    pub fn new(store: Arc<dyn TokenStore>, hooks: Arc<dyn SessionHooks>) -> Self {
        Self {
            store,
            hooks,
            signed_out: AtomicBool::new(false),
            maintenance_seen: AtomicBool::new(false),
        }
    }

    /// End the session: clear stored credentials and signal the sign-in
    /// redirect. Idempotent for the life of the terminator.
    pub fn terminate(&self) {
        if self
            .signed_out
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            tracing::info!("Session terminated; clearing credentials");
            self.store.clear_all();
            self.hooks.goto_login();
        }
    }

    /// One-time maintenance redirect, independent of session state.
    pub fn maintenance(&self) {
        if self
            .maintenance_seen
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            tracing::warn!("Portal reported maintenance mode");
            self.hooks.goto_maintenance();
        }
    }

    /// Re-arm the redirect guard. The CLI signs in per-process, so only
    /// tests and long-lived hosts need this.
    #[cfg(test)]
    pub fn reset(&self) {
        self.signed_out.store(false, Ordering::SeqCst);
    }
}
