use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Priority value meaning "no priority was given"
pub const UNSET_PRIORITY: i32 = -1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Short numeric identifier. Left empty until the store assigns one
    #[serde(default)]
    pub id: String,
    /// Title of the task
    #[serde(default)]
    pub title: String,
    /// Whether the task is done
    #[serde(default)]
    pub is_done: bool,
    /// Higher is more important, `UNSET_PRIORITY` when not given
    #[serde(default = "unset_priority")]
    pub priority: i32,
    /// Day the task was created
    #[serde(default = "local_today")]
    pub created_date: Date,
    /// Day by which the task should be done
    #[serde(default)]
    pub due_date: Option<Date>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            is_done: false,
            priority: UNSET_PRIORITY,
            created_date: local_today(),
            due_date: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: Option<Date>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn with_created_date(mut self, created_date: Date) -> Self {
        self.created_date = created_date;
        self
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_done { "done" } else { "pending" }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} | {} | Pr={} | {} | Due={}",
            self.id,
            self.title,
            self.status_label(),
            self.priority,
            self.created_date,
            self.due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "None".to_string())
        )
    }
}

/// Fields to overwrite on an existing task. `None` leaves a field untouched;
/// `due_date: Some(None)` clears the due date.
#[derive(Debug, Default, Clone)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub is_done: Option<bool>,
    pub priority: Option<i32>,
    pub created_date: Option<Date>,
    pub due_date: Option<Option<Date>>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.is_done.is_none()
            && self.priority.is_none()
            && self.created_date.is_none()
            && self.due_date.is_none()
    }

    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(is_done) = self.is_done {
            task.is_done = is_done;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(created_date) = self.created_date {
            task.created_date = created_date;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}

/// Current date in the system time zone
pub fn local_today() -> Date {
    jiff::Zoned::now().date()
}

fn unset_priority() -> i32 {
    UNSET_PRIORITY
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use serde_json::json;

    fn sample_task() -> Task {
        Task {
            id: String::from("1042"),
            title: String::from("Buy milk"),
            is_done: true,
            priority: 3,
            created_date: date(2024, 1, 1),
            due_date: Some(date(2099, 1, 1)),
        }
    }

    #[test]
    fn test_serializes_with_fixed_keys() {
        let value = serde_json::to_value(sample_task()).unwrap();

        assert_eq!(
            value,
            json!({
                "id": "1042",
                "title": "Buy milk",
                "is_done": true,
                "priority": 3,
                "created_date": "2024-01-01",
                "due_date": "2099-01-01",
            })
        );
    }

    #[test]
    fn test_absent_due_date_serializes_as_null() {
        let task = Task::new("No deadline").with_created_date(date(2024, 5, 6));
        let value = serde_json::to_value(&task).unwrap();

        assert!(value["due_date"].is_null());
        assert_eq!(value["priority"], json!(-1));
    }

    #[test]
    fn test_mapping_round_trip() {
        let task = sample_task();
        let value = serde_json::to_value(&task).unwrap();
        let restored: Task = serde_json::from_value(value).unwrap();

        assert_eq!(restored, task);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let task: Task = serde_json::from_value(json!({ "id": "7" })).unwrap();

        assert_eq!(task.id, "7");
        assert_eq!(task.title, "");
        assert!(!task.is_done);
        assert_eq!(task.priority, UNSET_PRIORITY);
        assert_eq!(task.created_date, local_today());
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let result: Result<Task, _> =
            serde_json::from_value(json!({ "id": "7", "created_date": "01/02/2024" }));

        assert!(result.is_err());
    }

    #[test]
    fn test_update_only_touches_given_fields() {
        let mut task = sample_task();
        let update = TaskUpdate {
            priority: Some(5),
            ..TaskUpdate::default()
        };

        update.apply_to(&mut task);

        assert_eq!(
            task,
            Task {
                priority: 5,
                ..sample_task()
            }
        );
    }

    #[test]
    fn test_update_can_clear_due_date() {
        let mut task = sample_task();
        let update = TaskUpdate {
            due_date: Some(None),
            ..TaskUpdate::default()
        };

        assert!(!update.is_empty());
        update.apply_to(&mut task);

        assert_eq!(task.due_date, None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample_task().to_string(),
            "1042: Buy milk | done | Pr=3 | 2024-01-01 | Due=2099-01-01"
        );
    }
}
