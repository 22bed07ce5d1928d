//! Configuration options for the StudyTrack client

use std::time::Duration;

/// Configuration options for the StudyTrack client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Whether the identity client keeps the session in memory after sign-in
    pub persist_session: bool,

    /// Whether sign-out also invalidates the session on every device
    pub global_sign_out: bool,

    /// Path prefix for identity-provider endpoints
    pub identity_path: String,

    /// Path prefix for task endpoints
    pub tasks_path: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            persist_session: true,
            global_sign_out: true,
            identity_path: "/identity/v1".to_string(),
            tasks_path: "/tasks".to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set whether sign-out is global
    pub fn with_global_sign_out(mut self, value: bool) -> Self {
        self.global_sign_out = value;
        self
    }

    /// Set the identity-provider path prefix
    pub fn with_identity_path(mut self, value: &str) -> Self {
        self.identity_path = value.to_string();
        self
    }

    /// Set the task-endpoint path prefix
    pub fn with_tasks_path(mut self, value: &str) -> Self {
        self.tasks_path = value.to_string();
        self
    }
}
