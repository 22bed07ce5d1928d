//! Identity-provider boundary: account registration, OTP confirmation,
//! sign-in, and session tracking

mod types;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::config::ClientOptions;
use crate::error::{AuthErrorKind, Error};
use crate::fetch::Fetch;

pub use types::*;

/// Operations the client needs from a hosted identity provider.
///
/// The auth controller and the REST task store depend on this trait rather
/// than on [`HostedIdentityClient`] directly, so tests can substitute an
/// in-memory provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account. The provider sends a confirmation code
    /// out-of-band; no session exists until the account is confirmed and
    /// signed in.
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<(), Error>;

    /// Submit the confirmation code for a pending registration.
    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), Error>;

    /// Ask the provider to resend the confirmation code.
    async fn resend_confirmation_code(&self, email: &str) -> Result<(), Error>;

    /// Authenticate with email and password.
    ///
    /// Signing in to an unconfirmed account fails with
    /// [`AuthErrorKind::NotConfirmed`] rather than succeeding.
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, Error>;

    /// Invalidate the current session; `global` also revokes it on every
    /// other device. The locally held session is dropped even when the
    /// remote call fails.
    async fn sign_out(&self, global: bool) -> Result<(), Error>;

    /// Resolve the identity behind the current session, if one exists.
    async fn current_user(&self) -> Result<UserProfile, Error>;

    /// The current valid session, used to mint bearer tokens for API calls.
    async fn current_session(&self) -> Result<ProviderSession, Error>;
}

/// HTTP client for the hosted identity provider
pub struct HostedIdentityClient {
    /// The base URL for the provider
    url: String,

    /// The client API key
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session
    session: Arc<Mutex<Option<ProviderSession>>>,

    /// Client options
    options: ClientOptions,
}

impl HostedIdentityClient {
    /// Create a new identity client
    pub fn new(url: &str, key: &str, client: Client, options: ClientOptions) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(Mutex::new(None)),
            options,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.url, self.options.identity_path, path)
    }

    fn stored_session(&self) -> Option<ProviderSession> {
        let current = self.session.lock().unwrap();
        current.clone()
    }

    fn store_session(&self, session: Option<ProviderSession>) {
        let mut current = self.session.lock().unwrap();
        *current = session;
    }

    /// Convert a non-2xx provider response into a categorized auth error.
    async fn provider_error(response: reqwest::Response) -> Error {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ProviderErrorBody>(&text) {
            Ok(body) => {
                let kind = body
                    .code
                    .as_deref()
                    .map(AuthErrorKind::from_provider_code)
                    .unwrap_or(AuthErrorKind::Unknown);
                let message = body.message.unwrap_or_else(|| kind.message().to_string());
                debug!("provider error {}: {}", status, message);
                Error::auth(kind, message)
            }
            Err(_) => {
                warn!("unparseable provider error body, status {}", status);
                Error::auth(
                    AuthErrorKind::Unknown,
                    format!("provider returned status {}", status),
                )
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentityClient {
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<(), Error> {
        let url = self.endpoint("/signup");

        let body = json!({
            "username": email,
            "password": password,
            "attributes": { "email": email, "name": name },
        });

        let response = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .json(&body)?
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        debug!("sign-up accepted for {}, confirmation pending", email);
        Ok(())
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), Error> {
        let url = self.endpoint("/confirm");

        let body = json!({ "username": email, "code": code });

        let response = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .json(&body)?
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        Ok(())
    }

    async fn resend_confirmation_code(&self, email: &str) -> Result<(), Error> {
        let url = self.endpoint("/resend");

        let body = json!({ "username": email });

        let response = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .json(&body)?
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, Error> {
        let url = self.endpoint("/signin");

        let body = json!({ "username": email, "password": password });

        let response = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .json(&body)?
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let session: ProviderSession = response.json().await?;
        let profile = UserProfile::from_provider(&session.user);

        if self.options.persist_session {
            self.store_session(Some(session));
        }

        debug!("signed in as {}", profile.email);
        Ok(profile)
    }

    async fn sign_out(&self, global: bool) -> Result<(), Error> {
        // Drop the cached session first: the user must end up signed out
        // locally even if the revocation request fails.
        let session = self.stored_session();
        self.store_session(None);

        let session = match session {
            Some(session) => session,
            None => return Ok(()),
        };

        let url = self.endpoint("/signout");

        let response = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .bearer_auth(session.bearer_token())
            .query("global", if global { "true" } else { "false" })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        Ok(())
    }

    async fn current_user(&self) -> Result<UserProfile, Error> {
        let session = self.current_session().await?;

        let url = self.endpoint("/user");

        let response = Fetch::get(&self.client, &url)
            .header("apikey", &self.key)
            .bearer_auth(session.bearer_token())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let user: ProviderUser = response.json().await?;
        Ok(UserProfile::from_provider(&user))
    }

    async fn current_session(&self) -> Result<ProviderSession, Error> {
        match self.stored_session() {
            Some(session) if !session.is_expired() => Ok(session),
            Some(_) => {
                self.store_session(None);
                Err(Error::auth(AuthErrorKind::Unknown, "session expired"))
            }
            None => Err(Error::auth(AuthErrorKind::Unknown, "not signed in")),
        }
    }
}
