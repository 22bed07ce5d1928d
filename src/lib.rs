//! StudyTrack Rust Client Library
//!
//! A Rust client for the StudyTrack student task service, covering account
//! authentication (sign-up, OTP confirmation, sign-in, sign-out) against a
//! hosted identity provider and synchronized task CRUD against the task API.
//!
//! Configuration is explicit: construct one [`StudyTrack`] at process start
//! and hand its components to whatever needs them. There is no module-level
//! global state, and both the identity provider and the task store sit
//! behind traits so they can be swapped out in tests.

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod session;
pub mod tasks;

use reqwest::Client;
use std::sync::Arc;

use crate::auth::AuthController;
use crate::config::ClientOptions;
use crate::identity::{HostedIdentityClient, IdentityProvider};
use crate::session::SessionStore;
use crate::tasks::{LocalTaskStore, RestTaskStore, StoragePort, TaskSync};

/// The main entry point for the StudyTrack client
pub struct StudyTrack {
    /// The base URL for the backend
    pub url: String,
    /// The client API key
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Client options
    pub options: ClientOptions,
    /// The identity-provider client, shared with the task store for tokens
    identity: Arc<HostedIdentityClient>,
    /// The single session store for this client
    session: SessionStore,
}

impl StudyTrack {
    /// Create a new StudyTrack client
    ///
    /// # Example
    ///
    /// ```
    /// use studytrack::StudyTrack;
    ///
    /// let client = StudyTrack::new("https://api.studytrack.example", "your-api-key");
    /// ```
    pub fn new(url: &str, key: &str) -> Self {
        Self::new_with_options(url, key, ClientOptions::default())
    }

    /// Create a new StudyTrack client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use studytrack::{config::ClientOptions, StudyTrack};
    ///
    /// let options = ClientOptions::default().with_global_sign_out(false);
    /// let client = StudyTrack::new_with_options(
    ///     "https://api.studytrack.example",
    ///     "your-api-key",
    ///     options,
    /// );
    /// ```
    pub fn new_with_options(url: &str, key: &str, options: ClientOptions) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().unwrap_or_default();

        let identity = Arc::new(HostedIdentityClient::new(
            url,
            key,
            http_client.clone(),
            options.clone(),
        ));

        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http_client,
            options,
            identity,
            session: SessionStore::new(),
        }
    }

    /// The session store holding the current authentication state
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The identity provider, for components that mint their own tokens
    pub fn identity(&self) -> Arc<dyn IdentityProvider> {
        Arc::clone(&self.identity) as Arc<dyn IdentityProvider>
    }

    /// Build the auth controller for sign-up, confirmation, sign-in, and
    /// sign-out
    pub fn auth(&self) -> AuthController {
        AuthController::new(self.identity(), self.session.clone(), self.options.clone())
    }

    /// Build a task sync handle for `user_id` backed by the task API.
    ///
    /// Pass the id resolved by the auth controller; `None` produces a handle
    /// whose operations are no-ops until a user signs in.
    pub fn tasks(&self, user_id: Option<&str>) -> TaskSync {
        let base_url = format!("{}{}", self.url, self.options.tasks_path);
        let store = RestTaskStore::new(&base_url, self.http_client.clone(), self.identity());
        TaskSync::new(Arc::new(store), user_id.map(str::to_string))
    }

    /// Build a task sync handle backed by a local storage port instead of
    /// the task API, for running without a backend
    pub fn tasks_local(&self, user_id: Option<&str>, storage: Arc<dyn StoragePort>) -> TaskSync {
        let store = LocalTaskStore::new(storage);
        TaskSync::new(Arc::new(store), user_id.map(str::to_string))
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::error::{AuthErrorKind, DataErrorKind, Error};
    pub use crate::identity::UserProfile;
    pub use crate::session::AuthState;
    pub use crate::tasks::{Priority, Status, Task, TaskDraft, TaskFilters};
    pub use crate::StudyTrack;
}
