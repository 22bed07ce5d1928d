//! Task persistence backends: the REST task API and the injectable local
//! fallback store

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::debug;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::error::{DataErrorKind, Error};
use crate::fetch::Fetch;
use crate::identity::IdentityProvider;

use super::types::{Task, TaskDraft};

/// CRUD surface a task backend has to provide.
///
/// Implemented by [`RestTaskStore`] against the task API and by
/// [`LocalTaskStore`] over an injectable key-value port; the sync layer does
/// not branch on which one it holds.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks belonging to `user_id`
    async fn list(&self, user_id: &str) -> Result<Vec<Task>, Error>;

    /// Persist a new task; the store assigns the id and timestamps
    async fn create(&self, draft: TaskDraft) -> Result<Task, Error>;

    /// Persist a changed task; the store refreshes `updated_at`
    async fn update(&self, task: Task) -> Result<Task, Error>;

    /// Remove a task
    async fn delete(&self, user_id: &str, task_id: &str) -> Result<(), Error>;
}

/// Task store backed by the REST task API.
///
/// A bearer token is minted from the identity provider's current session
/// before every request; an absent or expired session surfaces as the same
/// generic load/save error as any other request failure.
pub struct RestTaskStore {
    /// Full URL of the tasks endpoint group
    base_url: String,

    /// HTTP client used for requests
    client: Client,

    /// Source of bearer tokens
    identity: Arc<dyn IdentityProvider>,
}

impl RestTaskStore {
    /// Create a store for the tasks endpoint at `base_url`
    pub fn new(base_url: &str, client: Client, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            identity,
        }
    }

    async fn bearer(&self, kind: DataErrorKind) -> Result<String, Error> {
        let session = self
            .identity
            .current_session()
            .await
            .map_err(|err| Error::data(kind, format!("no valid session: {}", err)))?;
        Ok(session.bearer_token().to_string())
    }
}

#[async_trait]
impl TaskStore for RestTaskStore {
    async fn list(&self, user_id: &str) -> Result<Vec<Task>, Error> {
        let token = self.bearer(DataErrorKind::LoadFailed).await?;

        let response = Fetch::get(&self.client, &self.base_url)
            .bearer_auth(&token)
            .query("userId", user_id)
            .send()
            .await
            .map_err(|err| Error::data(DataErrorKind::LoadFailed, err))?;

        if !response.status().is_success() {
            return Err(Error::data(
                DataErrorKind::LoadFailed,
                format!("list returned status {}", response.status()),
            ));
        }

        let tasks = response
            .json::<Vec<Task>>()
            .await
            .map_err(|err| Error::data(DataErrorKind::LoadFailed, err))?;

        debug!("loaded {} tasks for {}", tasks.len(), user_id);
        Ok(tasks)
    }

    async fn create(&self, draft: TaskDraft) -> Result<Task, Error> {
        let token = self.bearer(DataErrorKind::SaveFailed).await?;

        let response = Fetch::post(&self.client, &self.base_url)
            .bearer_auth(&token)
            .json(&draft)?
            .send()
            .await
            .map_err(|err| Error::data(DataErrorKind::SaveFailed, err))?;

        if !response.status().is_success() {
            return Err(Error::data(
                DataErrorKind::SaveFailed,
                format!("create returned status {}", response.status()),
            ));
        }

        response
            .json::<Task>()
            .await
            .map_err(|err| Error::data(DataErrorKind::SaveFailed, err))
    }

    async fn update(&self, task: Task) -> Result<Task, Error> {
        let token = self.bearer(DataErrorKind::SaveFailed).await?;
        let url = format!("{}/{}", self.base_url, task.id);

        let response = Fetch::put(&self.client, &url)
            .bearer_auth(&token)
            .json(&task)?
            .send()
            .await
            .map_err(|err| Error::data(DataErrorKind::SaveFailed, err))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::data(DataErrorKind::NotFound, "task not found"));
        }
        if !response.status().is_success() {
            return Err(Error::data(
                DataErrorKind::SaveFailed,
                format!("update returned status {}", response.status()),
            ));
        }

        response
            .json::<Task>()
            .await
            .map_err(|err| Error::data(DataErrorKind::SaveFailed, err))
    }

    async fn delete(&self, _user_id: &str, task_id: &str) -> Result<(), Error> {
        let token = self.bearer(DataErrorKind::SaveFailed).await?;
        let url = format!("{}/{}", self.base_url, task_id);

        let response = Fetch::delete(&self.client, &url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|err| Error::data(DataErrorKind::SaveFailed, err))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::data(DataErrorKind::NotFound, "task not found"));
        }
        if !response.status().is_success() {
            return Err(Error::data(
                DataErrorKind::SaveFailed,
                format!("delete returned status {}", response.status()),
            ));
        }

        Ok(())
    }
}

/// Key-value port behind the local fallback store: one task list per user.
#[async_trait]
pub trait StoragePort: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Vec<Task>, Error>;
    async fn set(&self, user_id: &str, tasks: &[Task]) -> Result<(), Error>;
}

/// In-memory [`StoragePort`], the default backing for [`LocalTaskStore`]
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Vec<Task>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoragePort for MemoryStorage {
    async fn get(&self, user_id: &str) -> Result<Vec<Task>, Error> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(user_id).cloned().unwrap_or_default())
    }

    async fn set(&self, user_id: &str, tasks: &[Task]) -> Result<(), Error> {
        let mut entries = self.entries.write().unwrap();
        entries.insert(user_id.to_string(), tasks.to_vec());
        Ok(())
    }
}

/// Task store over a [`StoragePort`], for running without a backend.
///
/// Unlike the REST variant, ids are generated client-side (UUID v4) and
/// timestamps are assigned here: `updated_at` strictly increases on every
/// mutation and never precedes `created_at`.
pub struct LocalTaskStore {
    storage: Arc<dyn StoragePort>,
}

impl LocalTaskStore {
    /// Create a store over the given port
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    /// Create a store over a fresh in-memory port
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }
}

#[async_trait]
impl TaskStore for LocalTaskStore {
    async fn list(&self, user_id: &str) -> Result<Vec<Task>, Error> {
        self.storage.get(user_id).await
    }

    async fn create(&self, draft: TaskDraft) -> Result<Task, Error> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            user_id: draft.user_id.clone(),
            title: draft.title,
            description: draft.description,
            subject: draft.subject,
            priority: draft.priority,
            status: draft.status,
            due_date: draft.due_date,
            created_at: now,
            updated_at: now,
        };

        let mut tasks = self.storage.get(&draft.user_id).await?;
        tasks.push(task.clone());
        self.storage.set(&draft.user_id, &tasks).await?;

        Ok(task)
    }

    async fn update(&self, task: Task) -> Result<Task, Error> {
        let mut tasks = self.storage.get(&task.user_id).await?;

        let existing = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| Error::data(DataErrorKind::NotFound, "task not found"))?;

        // updated_at must strictly increase even when the clock has not
        // advanced past the previous mutation.
        let now = Utc::now();
        let updated_at = if now > existing.updated_at {
            now
        } else {
            existing.updated_at + Duration::microseconds(1)
        };

        let updated = Task {
            updated_at,
            created_at: existing.created_at,
            ..task
        };
        *existing = updated.clone();

        let user_id = updated.user_id.clone();
        self.storage.set(&user_id, &tasks).await?;

        Ok(updated)
    }

    async fn delete(&self, user_id: &str, task_id: &str) -> Result<(), Error> {
        let mut tasks = self.storage.get(user_id).await?;
        let before = tasks.len();
        tasks.retain(|t| t.id != task_id);

        if tasks.len() == before {
            return Err(Error::data(DataErrorKind::NotFound, "task not found"));
        }

        self.storage.set(user_id, &tasks).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::types::{Priority, Status};

    fn draft(user: &str, title: &str) -> TaskDraft {
        TaskDraft {
            user_id: user.to_string(),
            title: title.to_string(),
            description: None,
            subject: "Math".to_string(),
            priority: Priority::Medium,
            status: Status::Pending,
            due_date: Utc::now() + Duration::days(1),
        }
    }

    #[tokio::test]
    async fn local_store_assigns_unique_ids() {
        let store = LocalTaskStore::in_memory();
        let a = store.create(draft("u-1", "one")).await.unwrap();
        let b = store.create(draft("u-1", "two")).await.unwrap();
        assert_ne!(a.id, b.id);

        let tasks = store.list("u-1").await.unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[tokio::test]
    async fn local_store_updated_at_strictly_increases() {
        let store = LocalTaskStore::in_memory();
        let task = store.create(draft("u-1", "one")).await.unwrap();
        assert_eq!(task.created_at, task.updated_at);

        let mut changed = task.clone();
        changed.status = Status::Completed;
        let first = store.update(changed.clone()).await.unwrap();
        assert!(first.updated_at > task.updated_at);

        let second = store.update(first.clone()).await.unwrap();
        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.created_at, task.created_at);
    }

    #[tokio::test]
    async fn local_store_scopes_lists_per_user() {
        let store = LocalTaskStore::in_memory();
        store.create(draft("u-1", "mine")).await.unwrap();
        store.create(draft("u-2", "theirs")).await.unwrap();

        let mine = store.list("u-1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "mine");
    }

    #[tokio::test]
    async fn deleting_a_missing_task_reports_not_found() {
        let store = LocalTaskStore::in_memory();
        let err = store.delete("u-1", "nope").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Data {
                kind: DataErrorKind::NotFound,
                ..
            }
        ));
    }
}
