//! Session resolution.
//!
//! [`SessionResolver`] is the only writer of the session state. It turns
//! identity-provider notifications into a resolved [`SessionState`] by
//! reading the principal's account, and it signs blocked principals out.
//! Everything else observes the state through a [`SessionHandle`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use carelink_core::error::CarelinkError;
use carelink_core::models::principal::Principal;
use carelink_core::models::session::SessionState;
use carelink_core::repository::AccountRepository;
use tokio::sync::watch;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::identity::IdentityProvider;

/// Read-only view of the session state.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<SessionState>,
}

impl SessionHandle {
    pub fn current(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// Wait for the next change. `None` once the resolver is gone.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the state is resolved (returns immediately if it already is).
    pub async fn wait_resolved(&mut self) -> Option<SessionState> {
        self.rx
            .wait_for(|state| state.resolved)
            .await
            .ok()
            .map(|state| state.clone())
    }
}

pub struct SessionResolver<I: IdentityProvider, A: AccountRepository> {
    identity: Arc<I>,
    accounts: A,
    state: watch::Sender<SessionState>,
    /// Bumped on every resolution; a result is only published while its
    /// generation is still the latest.
    generation: AtomicU64,
    /// Set while a blocked principal is being signed out, so the absent
    /// principal that follows resolves to the blocked marker.
    blocked_sign_out: AtomicBool,
    config: ResolverConfig,
}

impl<I: IdentityProvider, A: AccountRepository> SessionResolver<I, A> {
    pub fn new(identity: Arc<I>, accounts: A, config: ResolverConfig) -> Self {
        let (state, _) = watch::channel(SessionState::loading());
        Self {
            identity,
            accounts,
            state,
            generation: AtomicU64::new(0),
            blocked_sign_out: AtomicBool::new(false),
            config,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.state.subscribe(),
        }
    }

    pub fn identity(&self) -> &Arc<I> {
        &self.identity
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Publish `next` unless a newer resolution has started.
    fn publish(&self, generation: u64, next: SessionState) -> bool {
        self.state.send_if_modified(|state| {
            if !self.is_current(generation) || *state == next {
                return false;
            }
            *state = next;
            true
        })
    }

    /// Derive the session for `principal` and publish it.
    ///
    /// Store failures are logged and resolve to a session without role or
    /// status. Returns the state current after this resolution, which may
    /// be a newer one if this resolution was superseded.
    pub async fn resolve(&self, principal: Option<Principal>) -> SessionState {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(principal) = principal else {
            let blocked = self.blocked_sign_out.swap(false, Ordering::SeqCst)
                || self.state.borrow().is_blocked_out();
            let next = if blocked {
                SessionState::blocked_out()
            } else {
                SessionState::signed_out()
            };
            self.publish(generation, next);
            return self.current();
        };

        self.blocked_sign_out.store(false, Ordering::SeqCst);

        if self.state.borrow().principal_id() != Some(principal.id) {
            self.publish(generation, SessionState::pending(principal.clone()));
        }

        let next = match self.accounts.get(principal.id).await {
            Ok(account) if account.status.is_blocked() => {
                if !self.is_current(generation) {
                    debug!(principal_id = %principal.id, "Discarding superseded resolution");
                    return self.current();
                }

                warn!(principal_id = %principal.id, "Account is blocked, signing out");

                // Drop to loading so nothing protected renders while the
                // sign-out is in flight.
                self.publish(generation, SessionState::pending(principal.clone()));
                self.blocked_sign_out.store(true, Ordering::SeqCst);

                if let Err(e) = self.identity.sign_out().await {
                    warn!(principal_id = %principal.id, error = %e, "Sign-out of blocked principal failed");
                }

                if !self.blocked_sign_out.swap(false, Ordering::SeqCst) {
                    // The sign-out notification already resolved the session.
                    return self.current();
                }
                SessionState::blocked_out()
            }
            Ok(account) => SessionState {
                principal: Some(principal),
                role: Some(account.role),
                status: Some(account.status),
                resolved: true,
            },
            Err(CarelinkError::NotFound { .. }) => {
                debug!(principal_id = %principal.id, "Principal has no account yet");
                SessionState {
                    principal: Some(principal),
                    role: None,
                    status: None,
                    resolved: true,
                }
            }
            Err(e) => {
                warn!(principal_id = %principal.id, error = %e, "Account lookup failed, resolving without role");
                SessionState {
                    principal: Some(principal),
                    role: None,
                    status: None,
                    resolved: true,
                }
            }
        };

        if !self.publish(generation, next) && !self.is_current(generation) {
            debug!("Discarding superseded resolution");
        }
        self.current()
    }

    /// Re-resolve the principal currently reported by the identity provider.
    pub async fn refresh(&self) -> SessionState {
        self.resolve(self.identity.current()).await
    }

    /// Follow identity-provider notifications until the provider goes away.
    ///
    /// A notification that arrives while a resolution is in flight cancels
    /// it; the newest principal is resolved instead. With a refresh interval
    /// configured the current principal is also re-resolved periodically.
    pub async fn run(self: Arc<Self>) {
        let mut principals = self.identity.subscribe();
        let mut ticker = self.config.refresh_interval.map(|period| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        info!("Session resolver started");

        loop {
            let principal = principals.borrow_and_update().clone();

            tokio::select! {
                _ = self.resolve(principal) => {}
                changed = principals.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    debug!("Resolution superseded by a newer session change");
                    continue;
                }
            }

            tokio::select! {
                changed = principals.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = next_tick(&mut ticker) => {
                    debug!("Periodic session refresh");
                }
            }
        }

        info!("Identity provider closed, session resolver stopping");
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
