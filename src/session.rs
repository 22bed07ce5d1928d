//! The single authoritative in-memory authentication state

use std::sync::{Arc, RwLock};

use crate::identity::UserProfile;

/// Snapshot of the client's authentication state.
///
/// Exactly one lives per [`SessionStore`]. It starts in the "resolving"
/// shape (`loading = true`, no user) and transitions only through the auth
/// controller's operations.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    /// The signed-in identity, if any
    pub user: Option<UserProfile>,

    /// Whether an auth operation is currently in flight
    pub loading: bool,

    /// The most recent user-facing error message, if any
    pub error: Option<String>,

    /// Whether a registration is waiting on its confirmation code
    pub needs_confirmation: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
            error: None,
            needs_confirmation: false,
        }
    }
}

impl AuthState {
    /// The shape the store resets to on sign-out.
    pub fn signed_out() -> Self {
        Self {
            user: None,
            loading: false,
            error: None,
            needs_confirmation: false,
        }
    }
}

type Subscriber = Arc<dyn Fn(&AuthState) + Send + Sync>;

/// Holds the [`AuthState`] and notifies subscribers on every change.
///
/// Reading is open to anyone holding the store; mutation happens only
/// through the auth controller (the setters are crate-private). Subscribers
/// are invoked synchronously, with no store lock held, so a callback may
/// read the store or register further subscribers.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<AuthState>>,
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a store in the initial "resolving" state
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(AuthState::default())),
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// A copy of the current state
    pub fn snapshot(&self) -> AuthState {
        let state = self.state.read().unwrap();
        state.clone()
    }

    /// Register a callback invoked with every state change
    pub fn subscribe<F>(&self, f: F)
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let mut subscribers = self.subscribers.write().unwrap();
        subscribers.push(Arc::new(f));
    }

    /// Apply a mutation and notify subscribers with the resulting state.
    pub(crate) fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut AuthState),
    {
        let snapshot = {
            let mut state = self.state.write().unwrap();
            f(&mut state);
            state.clone()
        };

        // Clone the list out so callbacks run without the lock; a callback
        // may itself call subscribe().
        let subscribers: Vec<Subscriber> = self.subscribers.read().unwrap().clone();
        for subscriber in &subscribers {
            subscriber(&snapshot);
        }
    }

    /// Replace the state wholesale and notify subscribers.
    pub(crate) fn replace(&self, next: AuthState) {
        self.update(|state| *state = next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn initial_state_is_resolving() {
        let store = SessionStore::new();
        let state = store.snapshot();
        assert!(state.user.is_none());
        assert!(state.loading);
        assert!(state.error.is_none());
        assert!(!state.needs_confirmation);
    }

    #[test]
    fn subscribers_see_every_change() {
        let store = SessionStore::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&calls);
        store.subscribe(move |state| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert!(!state.loading);
        });

        store.update(|state| state.loading = false);
        store.update(|state| state.error = Some("oops".to_string()));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn a_subscriber_may_register_another_subscriber() {
        let store = SessionStore::new();
        let late_calls = Arc::new(AtomicUsize::new(0));

        let inner_store = store.clone();
        let counter = Arc::clone(&late_calls);
        store.subscribe(move |_| {
            let seen = Arc::clone(&counter);
            inner_store.subscribe(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        });

        // First change registers one late subscriber, second change reaches it.
        store.update(|state| state.loading = false);
        store.update(|state| state.error = Some("oops".to_string()));

        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn replace_resets_to_signed_out_shape() {
        let store = SessionStore::new();
        store.update(|state| {
            state.error = Some("stale".to_string());
            state.needs_confirmation = true;
        });

        store.replace(AuthState::signed_out());

        let state = store.snapshot();
        assert_eq!(state, AuthState::signed_out());
    }
}
