//! Task data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How urgent a task is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Where a task stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
}

/// A single task as stored by the backend.
///
/// `id` is assigned by the store at creation. `updated_at` never precedes
/// `created_at` and strictly increases on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned unique identifier
    pub id: String,

    /// The owning account's identity id
    #[serde(rename = "user_id")]
    pub user_id: String,

    /// Short summary; never empty
    pub title: String,

    /// Longer free-form notes
    #[serde(default)]
    pub description: Option<String>,

    /// Free-text category label, e.g. "Math"
    pub subject: String,

    /// Urgency
    pub priority: Priority,

    /// Progress state
    pub status: Status,

    /// When the task is due
    #[serde(rename = "due_date")]
    pub due_date: DateTime<Utc>,

    /// When the task was created
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,

    /// When the task last changed
    #[serde(rename = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

/// A task as submitted for creation: no id and no timestamps yet, those are
/// the store's to assign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDraft {
    /// The owning account's identity id
    #[serde(rename = "user_id")]
    pub user_id: String,

    /// Short summary; must be non-empty
    pub title: String,

    /// Longer free-form notes
    pub description: Option<String>,

    /// Free-text category label
    pub subject: String,

    /// Urgency
    pub priority: Priority,

    /// Progress state
    pub status: Status,

    /// When the task is due
    #[serde(rename = "due_date")]
    pub due_date: DateTime<Utc>,
}
