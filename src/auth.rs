//! Auth controller: drives the session lifecycle against the identity
//! provider and keeps the [`SessionStore`] consistent

use log::{debug, warn};
use std::sync::Arc;

use crate::config::ClientOptions;
use crate::error::AuthErrorKind;
use crate::identity::IdentityProvider;
use crate::session::{AuthState, SessionStore};

/// Minimum password length checked before a sign-up is submitted. The
/// provider enforces its own policy; this only catches obviously unusable
/// input before a round trip.
const MIN_PASSWORD_LEN: usize = 6;

/// Orchestrates sign-up, confirmation, sign-in, and sign-out.
///
/// Every operation clears `loading` on every exit path, and a successful
/// operation clears any previous error. Failures never propagate out as
/// panics or errors; they land in [`AuthState::error`] as a user-facing
/// message.
pub struct AuthController {
    provider: Arc<dyn IdentityProvider>,
    store: SessionStore,
    options: ClientOptions,
}

impl AuthController {
    /// Create a controller over the given provider and session store
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: SessionStore,
        options: ClientOptions,
    ) -> Self {
        Self {
            provider,
            store,
            options,
        }
    }

    /// The session store this controller mutates
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Resolve an existing session at startup.
    ///
    /// A missing or expired session is the normal signed-out case, so it is
    /// never surfaced as an error; the store just leaves `loading`.
    pub async fn check_session(&self) {
        match self.provider.current_user().await {
            Ok(user) => {
                debug!("existing session resolved for {}", user.email);
                self.store.update(|state| {
                    state.user = Some(user.clone());
                    state.loading = false;
                    state.error = None;
                });
            }
            Err(_) => {
                self.store.update(|state| {
                    state.loading = false;
                });
            }
        }
    }

    /// Register a new account. Returns `true` when the provider accepted the
    /// registration and a confirmation code is on its way.
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> bool {
        if let Some(message) = validate_credentials(email, password) {
            self.store.update(|state| {
                state.error = Some(message.to_string());
                state.loading = false;
            });
            return false;
        }

        self.store.update(|state| {
            state.loading = true;
            state.error = None;
        });

        match self.provider.sign_up(email, password, name).await {
            Ok(()) => {
                self.store.update(|state| {
                    state.needs_confirmation = true;
                    state.loading = false;
                });
                true
            }
            Err(err) => {
                let message = err.user_message();
                self.store.update(|state| {
                    state.user = None;
                    state.loading = false;
                    state.error = Some(message.clone());
                });
                false
            }
        }
    }

    /// Submit the confirmation code for a pending registration.
    ///
    /// Success clears the confirmation flag; the caller still has to sign in
    /// explicitly afterwards. A wrong or expired code leaves the flag set.
    pub async fn confirm_sign_up(&self, email: &str, code: &str) -> bool {
        self.store.update(|state| {
            state.loading = true;
            state.error = None;
        });

        match self.provider.confirm_sign_up(email, code).await {
            Ok(()) => {
                self.store.update(|state| {
                    state.needs_confirmation = false;
                    state.loading = false;
                });
                true
            }
            Err(err) => {
                let message = err.user_message();
                self.store.update(|state| {
                    state.loading = false;
                    state.error = Some(message.clone());
                });
                false
            }
        }
    }

    /// Ask the provider to resend the confirmation code. Fire-and-forget:
    /// failure records an error but the confirmation flag is untouched.
    pub async fn resend_confirmation_code(&self, email: &str) {
        self.store.update(|state| {
            state.loading = true;
        });

        match self.provider.resend_confirmation_code(email).await {
            Ok(()) => {
                self.store.update(|state| {
                    state.loading = false;
                    state.error = None;
                });
            }
            Err(err) => {
                let message = err.user_message();
                self.store.update(|state| {
                    state.loading = false;
                    state.error = Some(message.clone());
                });
            }
        }
    }

    /// Authenticate with email and password. Returns `true` and populates
    /// the user on success. An unconfirmed account additionally flips
    /// `needs_confirmation` so the caller can route to the OTP screen.
    pub async fn sign_in(&self, email: &str, password: &str) -> bool {
        self.store.update(|state| {
            state.loading = true;
            state.error = None;
        });

        match self.provider.sign_in(email, password).await {
            Ok(user) => {
                self.store.update(|state| {
                    state.user = Some(user.clone());
                    state.loading = false;
                    state.error = None;
                    state.needs_confirmation = false;
                });
                true
            }
            Err(err) => {
                let not_confirmed = err.auth_kind() == Some(AuthErrorKind::NotConfirmed);
                let message = err.user_message();
                self.store.update(|state| {
                    state.user = None;
                    state.loading = false;
                    state.error = Some(message.clone());
                    if not_confirmed {
                        state.needs_confirmation = true;
                    }
                });
                false
            }
        }
    }

    /// Sign out. The local state always resets to the signed-out shape, even
    /// when the provider's revocation call fails.
    pub async fn sign_out(&self) {
        if let Err(err) = self.provider.sign_out(self.options.global_sign_out).await {
            warn!("remote sign-out failed, resetting locally anyway: {}", err);
        }
        self.store.replace(AuthState::signed_out());
    }
}

/// Pre-submission credential check. Returns the user-facing message for the
/// first problem found, or `None` when the input is worth sending to the
/// provider.
fn validate_credentials(email: &str, password: &str) -> Option<&'static str> {
    if !email_looks_valid(email) {
        return Some("Enter a valid email address.");
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Some("Password must be at least 6 characters.");
    }
    None
}

/// Syntactic email check only; the provider is authoritative.
fn email_looks_valid(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && domain.len() > 2
        }
        None => false,
    }
}
