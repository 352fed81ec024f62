use jiff::civil::Date;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    models::{
        store::Store,
        task::{Task, TaskUpdate},
    },
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum UpdateTaskError {
    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum ToggleTaskError {
    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// The task collection together with the storage it is mirrored to.
///
/// Every mutating call rewrites the whole backing file before returning.
pub struct TodoList<S: Storage> {
    store: Store,
    storage: S,
}

impl<S: Storage> TodoList<S> {
    /// Creates an empty list. Call [`TodoList::load`] to read the backing file.
    pub fn new(storage: S) -> Self {
        Self {
            store: Store::default(),
            storage,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Replaces the in-memory tasks with the stored ones and returns how many
    /// were read. A missing file is an empty list. On any other failure the
    /// list is left empty and the error is returned.
    ///
    /// Records are not loaded one by one: a single record with a malformed
    /// date or a `null` id makes the whole file fail with `ParseFailed`. The
    /// file itself is untouched until the next save, which backs it up first.
    pub fn load(&mut self) -> Result<usize, StorageError> {
        match self.storage.load() {
            Ok(mut store) => {
                let assigned = store.assign_missing_ids();
                if assigned > 0 {
                    debug!(assigned, "assigned ids to tasks stored without one");
                }
                self.store = store;
                Ok(self.store.tasks.len())
            }
            Err(e) => {
                warn!(error = %e, "could not load tasks, starting with an empty list");
                self.store = Store::default();
                Err(e)
            }
        }
    }

    pub fn persist(&self) -> Result<(), StorageError> {
        self.storage.save(&self.store)
    }

    /// Persists the current tasks, restoring `previous` when the save fails so
    /// the in-memory list keeps matching the file.
    fn commit(&mut self, previous: Store) -> Result<(), StorageError> {
        if let Err(e) = self.persist() {
            warn!(error = %e, "save failed, discarding the unsaved change");
            self.store = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Appends the task, assigning an id when it has none, and persists.
    /// Nothing changes in memory when the save fails.
    pub fn add(&mut self, task: Task) -> Result<Task, StorageError> {
        let previous = self.store.clone();
        let task = self.store.add_task(task).clone();
        debug!(id = %task.id, "added task");
        self.commit(previous)?;
        Ok(task)
    }

    /// Removes every task with this id and persists. Returns how many were removed.
    pub fn remove(&mut self, id: &str) -> Result<usize, StorageError> {
        let previous = self.store.clone();
        let removed = self.store.remove_tasks(id);
        debug!(id, removed, "removed tasks");
        self.commit(previous)?;
        Ok(removed)
    }

    /// Overwrites the given fields of the first task with this id and persists.
    pub fn update(&mut self, id: &str, update: TaskUpdate) -> Result<Task, UpdateTaskError> {
        let previous = self.store.clone();
        let task = self
            .store
            .get_task_mut(id)
            .ok_or_else(|| UpdateTaskError::TaskNotFound(id.to_string()))?;
        update.apply_to(task);
        let task = task.clone();

        debug!(id, "updated task");
        self.commit(previous)?;
        Ok(task)
    }

    pub fn toggle_done(&mut self, id: &str) -> Result<Task, ToggleTaskError> {
        let previous = self.store.clone();
        let task = self
            .store
            .get_task_mut(id)
            .ok_or_else(|| ToggleTaskError::TaskNotFound(id.to_string()))?;
        task.is_done = !task.is_done;
        let task = task.clone();

        debug!(id, is_done = task.is_done, "toggled task");
        self.commit(previous)?;
        Ok(task)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.store.get_task(id)
    }

    pub fn len(&self) -> usize {
        self.store.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.tasks.is_empty()
    }

    pub fn list_all(&self) -> &[Task] {
        &self.store.tasks
    }

    /// Oldest first. Tasks created on the same day keep their insertion order.
    pub fn list_sorted_by_creation(&self) -> Vec<&Task> {
        let mut tasks: Vec<_> = self.store.tasks.iter().collect();
        tasks.sort_by_key(|t| t.created_date);
        tasks
    }

    pub fn tasks_on_date(&self, date: Date) -> Vec<&Task> {
        self.store.tasks_created_on(date).collect()
    }

    pub fn tasks_due_on(&self, date: Date) -> Vec<&Task> {
        self.store.tasks_due_on(date).collect()
    }

    pub fn tasks_with_min_priority(&self, threshold: i32) -> Vec<&Task> {
        self.store.tasks_with_min_priority(threshold).collect()
    }
}
