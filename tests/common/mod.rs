//! Shared test doubles: an in-memory identity provider

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use studytrack::error::{AuthErrorKind, Error};
use studytrack::identity::{IdentityProvider, ProviderSession, ProviderUser, UserProfile};

pub const VALID_CODE: &str = "123456";

struct Account {
    sub: String,
    password: String,
    name: String,
    confirmed: bool,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    signed_in: Option<String>,
    fail_sign_out: bool,
    fail_resend: bool,
}

/// In-memory stand-in for the hosted identity provider. Confirmation codes
/// are always [`VALID_CODE`].
#[derive(Default)]
pub struct FakeIdentityProvider {
    state: Mutex<Inner>,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider with one confirmed, already signed-in account
    pub fn signed_in(sub: &str, email: &str) -> Self {
        let provider = Self::new();
        {
            let mut state = provider.state.lock().unwrap();
            state.accounts.insert(
                email.to_string(),
                Account {
                    sub: sub.to_string(),
                    password: "password1".to_string(),
                    name: "Test User".to_string(),
                    confirmed: true,
                },
            );
            state.signed_in = Some(email.to_string());
        }
        provider
    }

    pub fn fail_sign_out(&self) {
        self.state.lock().unwrap().fail_sign_out = true;
    }

    pub fn fail_resend(&self) {
        self.state.lock().unwrap().fail_resend = true;
    }

    fn profile_for(account: &Account, email: &str) -> UserProfile {
        UserProfile::from_provider(&ProviderUser {
            sub: account.sub.clone(),
            email: email.to_string(),
            name: Some(account.name.clone()),
            created_at: None,
        })
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        if state.accounts.contains_key(email) {
            return Err(Error::auth(
                AuthErrorKind::UserAlreadyExists,
                "UsernameExistsException",
            ));
        }
        let sub = format!("sub-{}", state.accounts.len() + 1);
        state.accounts.insert(
            email.to_string(),
            Account {
                sub,
                password: password.to_string(),
                name: name.to_string(),
                confirmed: false,
            },
        );
        Ok(())
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        let account = state
            .accounts
            .get_mut(email)
            .ok_or_else(|| Error::auth(AuthErrorKind::UserNotFound, "UserNotFoundException"))?;
        if code != VALID_CODE {
            return Err(Error::auth(
                AuthErrorKind::InvalidCode,
                "CodeMismatchException",
            ));
        }
        account.confirmed = true;
        Ok(())
    }

    async fn resend_confirmation_code(&self, email: &str) -> Result<(), Error> {
        let state = self.state.lock().unwrap();
        if state.fail_resend {
            return Err(Error::auth(AuthErrorKind::Unknown, "delivery failure"));
        }
        if !state.accounts.contains_key(email) {
            return Err(Error::auth(AuthErrorKind::UserNotFound, "UserNotFoundException"));
        }
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, Error> {
        let mut state = self.state.lock().unwrap();
        let account = state
            .accounts
            .get(email)
            .ok_or_else(|| Error::auth(AuthErrorKind::UserNotFound, "UserNotFoundException"))?;
        if !account.confirmed {
            return Err(Error::auth(
                AuthErrorKind::NotConfirmed,
                "UserNotConfirmedException",
            ));
        }
        if account.password != password {
            return Err(Error::auth(
                AuthErrorKind::InvalidCredentials,
                "NotAuthorizedException",
            ));
        }
        let profile = Self::profile_for(account, email);
        state.signed_in = Some(email.to_string());
        Ok(profile)
    }

    async fn sign_out(&self, _global: bool) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.signed_in = None;
        if state.fail_sign_out {
            return Err(Error::auth(AuthErrorKind::Unknown, "revocation failed"));
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<UserProfile, Error> {
        let state = self.state.lock().unwrap();
        let email = state
            .signed_in
            .as_ref()
            .ok_or_else(|| Error::auth(AuthErrorKind::Unknown, "not signed in"))?;
        let account = state
            .accounts
            .get(email)
            .ok_or_else(|| Error::auth(AuthErrorKind::Unknown, "not signed in"))?;
        Ok(Self::profile_for(account, email))
    }

    async fn current_session(&self) -> Result<ProviderSession, Error> {
        let state = self.state.lock().unwrap();
        let email = state
            .signed_in
            .as_ref()
            .ok_or_else(|| Error::auth(AuthErrorKind::Unknown, "not signed in"))?;
        let account = state
            .accounts
            .get(email)
            .ok_or_else(|| Error::auth(AuthErrorKind::Unknown, "not signed in"))?;
        Ok(ProviderSession {
            id_token: format!("token-for-{}", account.sub),
            refresh_token: None,
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: None,
            user: ProviderUser {
                sub: account.sub.clone(),
                email: email.clone(),
                name: Some(account.name.clone()),
                created_at: None,
            },
        })
    }
}
