//! Error handling for the StudyTrack client

use std::fmt;
use thiserror::Error;

/// Stable categories for identity-provider failures.
///
/// Provider-specific error codes are collapsed into these categories at the
/// provider boundary; the rest of the client only ever sees a kind and its
/// user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// The account exists but has not completed confirmation.
    NotConfirmed,
    /// Wrong email/password combination.
    InvalidCredentials,
    /// No account registered for the given email.
    UserNotFound,
    /// An account already exists for the given email.
    UserAlreadyExists,
    /// The confirmation code does not match.
    InvalidCode,
    /// The confirmation code has expired.
    ExpiredCode,
    /// Anything the provider reported that we do not recognize.
    Unknown,
}

impl AuthErrorKind {
    /// Map a provider error code to a stable category.
    ///
    /// Pure function; unrecognized codes fall through to `Unknown`.
    pub fn from_provider_code(code: &str) -> Self {
        match code {
            "UserNotConfirmedException" => Self::NotConfirmed,
            "NotAuthorizedException" => Self::InvalidCredentials,
            "UserNotFoundException" => Self::UserNotFound,
            "UsernameExistsException" => Self::UserAlreadyExists,
            "CodeMismatchException" => Self::InvalidCode,
            "ExpiredCodeException" => Self::ExpiredCode,
            _ => Self::Unknown,
        }
    }

    /// The single user-facing message for this category.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotConfirmed => {
                "Your account has not been confirmed yet. Enter the code we sent you."
            }
            Self::InvalidCredentials => "Incorrect email or password.",
            Self::UserNotFound => "No account found for that email address.",
            Self::UserAlreadyExists => "An account with that email already exists.",
            Self::InvalidCode => "That confirmation code is incorrect.",
            Self::ExpiredCode => "That confirmation code has expired. Request a new one.",
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }
}

/// Categories for task-store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataErrorKind {
    /// Fetching the task list failed.
    LoadFailed,
    /// Creating or updating a task failed.
    SaveFailed,
    /// The referenced task does not exist in the store.
    NotFound,
}

impl DataErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            Self::LoadFailed => "Could not load your tasks.",
            Self::SaveFailed => "Could not save your changes.",
            Self::NotFound => "That task no longer exists.",
        }
    }
}

/// Unified error type for the StudyTrack client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Identity-provider errors, already mapped to a stable category
    #[error("Authentication error: {message}")]
    Auth { kind: AuthErrorKind, message: String },

    /// Task-store errors
    #[error("Data error: {message}")]
    Data { kind: DataErrorKind, message: String },

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(kind: AuthErrorKind, msg: T) -> Self {
        Error::Auth {
            kind,
            message: msg.to_string(),
        }
    }

    /// Create a new task-store error
    pub fn data<T: fmt::Display>(kind: DataErrorKind, msg: T) -> Self {
        Error::Data {
            kind,
            message: msg.to_string(),
        }
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// The auth category, if this is an auth error.
    pub fn auth_kind(&self) -> Option<AuthErrorKind> {
        match self {
            Error::Auth { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The message shown to the user for this error.
    ///
    /// Auth and data errors surface their category's canonical message; every
    /// other failure collapses to the `Unknown` message so raw transport
    /// detail never reaches the UI.
    pub fn user_message(&self) -> String {
        match self {
            Error::Auth { kind, .. } => kind.message().to_string(),
            Error::Data { kind, .. } => kind.message().to_string(),
            _ => AuthErrorKind::Unknown.message().to_string(),
        }
    }
}
