//! Wire types for the hosted identity provider

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Account record as the provider returns it.
///
/// This shape never leaves the identity module; everything above the
/// provider boundary works with [`UserProfile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderUser {
    /// The provider's stable subject identifier
    pub sub: String,

    /// The user's email address
    pub email: String,

    /// The display name attribute, if set
    #[serde(default)]
    pub name: Option<String>,

    /// Registration time, when the provider exposes it
    #[serde(rename = "created_at", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Session data issued by the provider on sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSession {
    /// The identity token attached as the bearer credential on API calls
    #[serde(rename = "id_token")]
    pub id_token: String,

    /// The refresh token, when the provider issues one
    #[serde(rename = "refresh_token", default)]
    pub refresh_token: Option<String>,

    /// The token type
    #[serde(rename = "token_type")]
    pub token_type: String,

    /// The expiry time in seconds
    #[serde(rename = "expires_in")]
    pub expires_in: i64,

    /// The expiry timestamp
    #[serde(rename = "expires_at", default)]
    pub expires_at: Option<i64>,

    /// The signed-in account
    pub user: ProviderUser,
}

impl ProviderSession {
    /// The credential to attach as `Authorization: Bearer` on API requests.
    pub fn bearer_token(&self) -> &str {
        &self.id_token
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or(Duration::from_secs(0))
                .as_secs() as i64;

            now >= expires_at
        } else {
            false
        }
    }
}

/// Error body returned by the provider on failed requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderErrorBody {
    /// The provider-specific error code, e.g. `UserNotConfirmedException`
    #[serde(default)]
    pub code: Option<String>,

    /// The provider's own message text
    #[serde(default)]
    pub message: Option<String>,
}

/// The narrow identity shape the rest of the client works with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque external identifier, stable for the account's lifetime
    pub id: String,

    /// Unique login handle
    pub email: String,

    /// Display name; empty when the account has none
    pub name: String,

    /// Registration time
    pub created_at: DateTime<Utc>,

    /// Time of the most recent successful sign-in
    pub last_login: DateTime<Utc>,
}

impl UserProfile {
    /// Adapt a provider account record into the client's identity shape.
    ///
    /// `last_login` is stamped at call time; callers invoke this on each
    /// successful sign-in or session resolution.
    pub fn from_provider(user: &ProviderUser) -> Self {
        let now = Utc::now();
        Self {
            id: user.sub.clone(),
            email: user.email.clone(),
            name: user.name.clone().unwrap_or_default(),
            created_at: user.created_at.unwrap_or(now),
            last_login: now,
        }
    }
}
