use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::models::task::Task;

/// First id handed out to a store that holds no numeric ids yet
pub const FIRST_TASK_ID: u64 = 1000;

/// Ordered task sequence. Persisted as a bare JSON array.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct Store {
    pub tasks: Vec<Task>,
}

impl Store {
    /// One past the largest numeric id, so a generated id never collides
    /// with one already present. Once the largest id cannot be incremented,
    /// the lowest free id from `FIRST_TASK_ID` upwards is used instead.
    pub fn next_task_id(&self) -> String {
        let max = self
            .tasks
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max();

        let next = match max {
            None => FIRST_TASK_ID,
            Some(max) => match max.checked_add(1) {
                Some(next) => next.max(FIRST_TASK_ID),
                None => self.lowest_free_id(),
            },
        };
        next.to_string()
    }

    fn lowest_free_id(&self) -> u64 {
        let mut candidate = FIRST_TASK_ID;
        while self.tasks.iter().any(|t| t.id == candidate.to_string()) {
            candidate += 1;
        }
        candidate
    }

    /// Appends a task, assigning it an id if it has none.
    pub fn add_task(&mut self, mut task: Task) -> &Task {
        if task.id.is_empty() {
            task.id = self.next_task_id();
        }
        self.tasks.push(task);
        &self.tasks[self.tasks.len() - 1]
    }

    /// Gives every task without an id a fresh one. Returns how many were assigned.
    pub fn assign_missing_ids(&mut self) -> usize {
        let mut assigned = 0;
        for index in 0..self.tasks.len() {
            if self.tasks[index].id.is_empty() {
                self.tasks[index].id = self.next_task_id();
                assigned += 1;
            }
        }
        assigned
    }

    /// Removes every task with this id. Returns how many were removed.
    pub fn remove_tasks(&mut self, id: &str) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        before - self.tasks.len()
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn tasks_created_on(&self, date: Date) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.created_date == date)
    }

    pub fn tasks_due_on(&self, date: Date) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.due_date == Some(date))
    }

    pub fn tasks_with_min_priority(&self, threshold: i32) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.priority >= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn task_with_id(id: &str) -> Task {
        Task {
            id: id.to_string(),
            ..Task::new("Some Task")
        }
    }

    #[test]
    fn test_first_generated_id() {
        let store = Store::default();
        assert_eq!(store.next_task_id(), "1000");
    }

    #[test]
    fn test_generated_id_follows_largest_numeric_id() {
        let store = Store {
            tasks: vec![task_with_id("4821"), task_with_id("abc"), task_with_id("1003")],
        };
        assert_eq!(store.next_task_id(), "4822");
    }

    #[test]
    fn test_generated_id_never_below_first_id() {
        let store = Store {
            tasks: vec![task_with_id("12")],
        };
        assert_eq!(store.next_task_id(), "1000");
    }

    #[test]
    fn test_generated_id_past_u32_range() {
        let store = Store {
            tasks: vec![task_with_id("4294967295")],
        };
        assert_eq!(store.next_task_id(), "4294967296");
    }

    #[test]
    fn test_generated_id_when_largest_cannot_grow() {
        let mut store = Store {
            tasks: vec![task_with_id(&u64::MAX.to_string()), task_with_id("1000")],
        };

        store.add_task(Task::new("Fits in a gap"));
        store.add_task(Task::new("And another"));

        let ids: Vec<_> = store.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["18446744073709551615", "1000", "1001", "1002"]);
    }

    #[test]
    fn test_add_task_assigns_unique_ids() {
        let mut store = Store::default();
        let first = store.add_task(Task::new("One")).id.clone();
        let second = store.add_task(Task::new("Two")).id.clone();

        assert_ne!(first, second);
        assert_eq!(store.tasks.len(), 2);
    }

    #[test]
    fn test_add_task_keeps_explicit_id() {
        let mut store = Store::default();
        store.add_task(task_with_id("5555"));
        store.add_task(task_with_id("5555"));

        assert_eq!(store.tasks.len(), 2);
        assert!(store.tasks.iter().all(|t| t.id == "5555"));
    }

    #[test]
    fn test_assign_missing_ids() {
        let mut store = Store {
            tasks: vec![task_with_id(""), task_with_id("1500"), task_with_id("")],
        };

        assert_eq!(store.assign_missing_ids(), 2);
        let ids: Vec<_> = store.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1501", "1500", "1502"]);
    }

    #[test]
    fn test_remove_tasks_removes_all_matches() {
        let mut store = Store {
            tasks: vec![task_with_id("1"), task_with_id("2"), task_with_id("1")],
        };

        assert_eq!(store.remove_tasks("1"), 2);
        assert_eq!(store.remove_tasks("1"), 0);
        assert_eq!(store.tasks.len(), 1);
    }

    #[test]
    fn test_filters() {
        let day = date(2024, 1, 1);
        let store = Store {
            tasks: vec![
                task_with_id("1").with_created_date(day).with_priority(2),
                task_with_id("2")
                    .with_created_date(date(2023, 12, 31))
                    .with_due_date(Some(day))
                    .with_priority(7),
                task_with_id("3").with_created_date(date(2024, 1, 2)),
            ],
        };

        let created: Vec<_> = store.tasks_created_on(day).map(|t| &t.id).collect();
        let due: Vec<_> = store.tasks_due_on(day).map(|t| &t.id).collect();
        let important: Vec<_> = store.tasks_with_min_priority(2).map(|t| &t.id).collect();

        assert_eq!(created, vec!["1"]);
        assert_eq!(due, vec!["2"]);
        assert_eq!(important, vec!["1", "2"]);
    }

    #[test]
    fn test_serializes_as_bare_array() {
        let store = Store::default();
        assert_eq!(serde_json::to_string(&store).unwrap(), "[]");
    }
}
