use jiff::civil::Date;
use thiserror::Error;

use crate::{
    models::task::{Task, TaskUpdate, UNSET_PRIORITY},
    storage::{Storage, StorageError},
    todo_list::{TodoList, ToggleTaskError, UpdateTaskError},
};

#[derive(Debug, Error)]
#[error("Invalid date '{input}': {reason}")]
pub struct InvalidDate {
    pub input: String,
    pub reason: String,
}

/// Parses a date written exactly as `YYYY-MM-DD`. Compact, signed or
/// time-suffixed forms are rejected.
pub fn parse_date(input: &str) -> Result<Date, InvalidDate> {
    let trimmed = input.trim();
    let invalid = |reason: String| InvalidDate {
        input: input.to_string(),
        reason,
    };

    let well_formed = trimmed.len() == 10
        && trimmed.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(invalid(String::from("expected YYYY-MM-DD")));
    }

    jiff::fmt::strtime::parse("%Y-%m-%d", trimmed)
        .and_then(|parsed| parsed.to_date())
        .map_err(|e| invalid(e.to_string()))
}

#[derive(Debug, Error)]
pub enum AddTaskError {
    #[error("Task title cannot be empty")]
    EmptyTitle,

    #[error(transparent)]
    InvalidDueDate(#[from] InvalidDate),

    #[error("Due date {due} is before today ({today})")]
    DueDateInPast { due: Date, today: Date },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddTaskParameters {
    pub title: String,
    pub priority: Option<i32>,
    pub due_date: Option<String>,
}

pub fn add_task(
    list: &mut TodoList<impl Storage>,
    parameters: AddTaskParameters,
    today: Date,
) -> Result<Task, AddTaskError> {
    let title = parameters.title.trim();
    if title.is_empty() {
        return Err(AddTaskError::EmptyTitle);
    }

    let due_date = parameters.due_date.as_deref().map(parse_date).transpose()?;
    if let Some(due) = due_date
        && due < today
    {
        return Err(AddTaskError::DueDateInPast { due, today });
    }

    let task = Task::new(title)
        .with_priority(parameters.priority.unwrap_or(UNSET_PRIORITY))
        .with_due_date(due_date)
        .with_created_date(today);

    Ok(list.add(task)?)
}

#[derive(Debug, Error)]
pub enum EditTaskError {
    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("Task title cannot be empty")]
    EmptyTitle,

    #[error(transparent)]
    InvalidDueDate(#[from] InvalidDate),

    #[error("Nothing to change for task '{0}'")]
    NothingToChange(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct EditTaskParameters {
    pub id: String,
    pub title: Option<String>,
    pub priority: Option<i32>,
    pub due_date: Option<String>,
    pub clear_due_date: bool,
}

/// Past due dates are accepted here so old tasks can still be corrected.
pub fn edit_task(
    list: &mut TodoList<impl Storage>,
    parameters: EditTaskParameters,
) -> Result<Task, EditTaskError> {
    let title = match parameters.title {
        Some(title) if title.trim().is_empty() => return Err(EditTaskError::EmptyTitle),
        Some(title) => Some(title.trim().to_string()),
        None => None,
    };

    let due_date = if parameters.clear_due_date {
        Some(None)
    } else {
        parameters
            .due_date
            .as_deref()
            .map(parse_date)
            .transpose()?
            .map(Some)
    };

    let update = TaskUpdate {
        title,
        priority: parameters.priority,
        due_date,
        ..TaskUpdate::default()
    };
    if update.is_empty() {
        return Err(EditTaskError::NothingToChange(parameters.id));
    }

    list.update(&parameters.id, update).map_err(|e| match e {
        UpdateTaskError::TaskNotFound(id) => EditTaskError::TaskNotFound(id),
        UpdateTaskError::Storage(e) => EditTaskError::Storage(e),
    })
}

pub fn toggle_task(
    list: &mut TodoList<impl Storage>,
    id: &str,
) -> Result<Task, ToggleTaskError> {
    list.toggle_done(id)
}

#[derive(Debug, Error)]
pub enum RemoveTaskError {
    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Removes the task with this id, treating an unknown id as an error.
pub fn remove_task(list: &mut TodoList<impl Storage>, id: &str) -> Result<usize, RemoveTaskError> {
    if list.get(id).is_none() {
        return Err(RemoveTaskError::TaskNotFound(id.to_string()));
    }
    Ok(list.remove(id)?)
}
