//! Task synchronization: a local task list kept in step with an external
//! store

mod filter;
mod store;
mod types;

use log::debug;
use std::sync::Arc;

use crate::error::{DataErrorKind, Error};

pub use filter::*;
pub use store::*;
pub use types::*;

/// In-memory task list for one user, synchronized with a [`TaskStore`].
///
/// Local state only commits after the store call succeeds: a failed call
/// leaves the list exactly as it was, records a user-facing error, and
/// clears the loading flag. Nothing retries automatically.
pub struct TaskSync {
    store: Arc<dyn TaskStore>,
    user_id: Option<String>,
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
}

impl TaskSync {
    /// Create a sync handle for `user_id`; `None` means signed out, in which
    /// case every operation is a no-op until a user is attached.
    pub fn new(store: Arc<dyn TaskStore>, user_id: Option<String>) -> Self {
        Self {
            store,
            user_id,
            tasks: Vec::new(),
            loading: false,
            error: None,
        }
    }

    /// The current local list
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Whether a store call is in flight
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// The most recent error message, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The user this list belongs to
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Pure projection of the current list through `filters`
    pub fn filtered(&self, filters: &TaskFilters) -> Vec<Task> {
        filters.apply(&self.tasks)
    }

    /// Dashboard summary of the current list
    pub fn stats(&self) -> TaskStats {
        TaskStats::collect(&self.tasks, chrono::Utc::now())
    }

    /// Fetch the user's tasks from the store.
    ///
    /// Without a user this does nothing. On failure the previously loaded
    /// list is left untouched.
    pub async fn load(&mut self) -> Result<(), Error> {
        let user_id = match &self.user_id {
            Some(user_id) => user_id.clone(),
            None => return Ok(()),
        };

        self.loading = true;
        let result = self.store.list(&user_id).await;
        self.loading = false;

        match result {
            Ok(tasks) => {
                debug!("loaded {} tasks", tasks.len());
                self.tasks = tasks;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Create a task from a draft. The draft's `user_id` is overwritten with
    /// this list's user; the store-assigned task is appended only on
    /// success.
    pub async fn create(&mut self, mut draft: TaskDraft) -> Result<Task, Error> {
        let user_id = self.require_user(DataErrorKind::SaveFailed)?;
        draft.user_id = user_id;

        if draft.title.trim().is_empty() {
            let err = Error::data(DataErrorKind::SaveFailed, "task title must not be empty");
            self.error = Some(err.user_message());
            return Err(err);
        }

        self.loading = true;
        let result = self.store.create(draft).await;
        self.loading = false;

        match result {
            Ok(task) => {
                // The store assigns ids; replace rather than duplicate if it
                // ever hands back one we already hold.
                match self.tasks.iter_mut().find(|t| t.id == task.id) {
                    Some(existing) => *existing = task.clone(),
                    None => self.tasks.push(task.clone()),
                }
                self.error = None;
                Ok(task)
            }
            Err(err) => {
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Send a fully updated task to the store and replace the local entry by
    /// id on success. The store is authoritative for `updated_at`.
    pub async fn update(&mut self, task: Task) -> Result<(), Error> {
        self.require_user(DataErrorKind::SaveFailed)?;

        self.loading = true;
        let result = self.store.update(task).await;
        self.loading = false;

        match result {
            Ok(updated) => {
                if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == updated.id) {
                    *existing = updated;
                }
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Delete a task from the store, then drop it locally on success only.
    pub async fn delete(&mut self, task_id: &str) -> Result<(), Error> {
        let user_id = self.require_user(DataErrorKind::SaveFailed)?;

        self.loading = true;
        let result = self.store.delete(&user_id, task_id).await;
        self.loading = false;

        match result {
            Ok(()) => {
                self.tasks.retain(|t| t.id != task_id);
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    fn require_user(&mut self, kind: DataErrorKind) -> Result<String, Error> {
        match &self.user_id {
            Some(user_id) => Ok(user_id.clone()),
            None => {
                let err = Error::data(kind, "no signed-in user");
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }
}
