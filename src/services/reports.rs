use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use jiff::civil::Date;
use thiserror::Error;
use tracing::debug;

use crate::models::task::Task;

pub const CSV_HEADER: &str = "id,title,is_done,priority,created_date,due_date";
pub const DEFAULT_EXPORT_FILE: &str = "tasks_export.csv";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn default_report_file(date: Date) -> PathBuf {
    PathBuf::from(format!("report_{}.txt", date))
}

/// Plain-text summary of the tasks created on `date`.
pub fn render_daily_report(date: Date, tasks: &[&Task]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Daily report for {}", date);
    let _ = writeln!(out, "{}", "=".repeat(40));
    out.push('\n');

    if tasks.is_empty() {
        out.push_str("No tasks were created on this date.\n");
        return out;
    }

    for task in tasks {
        let _ = writeln!(out, "Task ID: {}", task.id);
        let _ = writeln!(out, "Title: {}", task.title);
        let _ = writeln!(out, "Status: {}", task.status_label());
        let _ = writeln!(out, "Priority: {}", task.priority);
        let _ = writeln!(out, "Created: {}", task.created_date);
        match task.due_date {
            Some(due) => {
                let _ = writeln!(out, "Due: {}", due);
            }
            None => out.push_str("Due: None\n"),
        }
        let _ = writeln!(out, "{}", "-".repeat(30));
    }

    out
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Fixed six-column CSV with the string fields quoted.
pub fn render_csv(tasks: &[Task]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for task in tasks {
        let due = task.due_date.map(|d| d.to_string()).unwrap_or_default();
        let _ = writeln!(
            out,
            "{},{},{},{},{},{}",
            quoted(&task.id),
            quoted(&task.title),
            u8::from(task.is_done),
            task.priority,
            quoted(&task.created_date.to_string()),
            quoted(&due),
        );
    }

    out
}

fn write_file(path: &Path, contents: String) -> Result<(), ReportError> {
    fs::write(path, contents).map_err(|e| ReportError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), "wrote file");
    Ok(())
}

pub fn write_daily_report(path: &Path, date: Date, tasks: &[&Task]) -> Result<(), ReportError> {
    write_file(path, render_daily_report(date, tasks))
}

pub fn write_csv(path: &Path, tasks: &[Task]) -> Result<(), ReportError> {
    write_file(path, render_csv(tasks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            ..Task::new(title).with_created_date(date(2024, 1, 1))
        }
    }

    #[test]
    fn test_empty_daily_report() {
        let report = render_daily_report(date(2024, 1, 1), &[]);

        assert_eq!(
            report,
            format!(
                "Daily report for 2024-01-01\n{}\n\nNo tasks were created on this date.\n",
                "=".repeat(40)
            )
        );
    }

    #[test]
    fn test_daily_report_lists_each_task() {
        let done = Task {
            is_done: true,
            priority: 4,
            due_date: Some(date(2024, 1, 5)),
            ..task("1000", "Pay rent")
        };
        let pending = task("1001", "Call mom");

        let report = render_daily_report(date(2024, 1, 1), &[&done, &pending]);
        let lines: Vec<_> = report.lines().collect();

        assert_eq!(lines[3], "Task ID: 1000");
        assert_eq!(lines[4], "Title: Pay rent");
        assert_eq!(lines[5], "Status: done");
        assert_eq!(lines[6], "Priority: 4");
        assert_eq!(lines[7], "Created: 2024-01-01");
        assert_eq!(lines[8], "Due: 2024-01-05");
        assert_eq!(lines[9], "-".repeat(30));
        assert_eq!(lines[11], "Title: Call mom");
        assert_eq!(lines[12], "Status: pending");
        assert_eq!(lines[15], "Due: None");
    }

    #[test]
    fn test_csv_rows() {
        let tasks = vec![
            Task {
                is_done: true,
                priority: 2,
                due_date: Some(date(2024, 2, 1)),
                ..task("1000", "Ship it")
            },
            task("1001", "Say \"hi\", then leave"),
        ];

        let csv = render_csv(&tasks);

        assert_eq!(
            csv,
            "id,title,is_done,priority,created_date,due_date\n\
             \"1000\",\"Ship it\",1,2,\"2024-01-01\",\"2024-02-01\"\n\
             \"1001\",\"Say \"\"hi\"\", then leave\",0,-1,\"2024-01-01\",\"\"\n"
        );
    }

    #[test]
    fn test_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = vec![task("1000", "Only")];
        let report_path = dir.path().join(default_report_file(date(2024, 1, 1)));
        let csv_path = dir.path().join(DEFAULT_EXPORT_FILE);

        write_daily_report(&report_path, date(2024, 1, 1), &[&tasks[0]]).unwrap();
        write_csv(&csv_path, &tasks).unwrap();

        assert!(report_path.ends_with("report_2024-01-01.txt"));
        assert!(
            fs::read_to_string(&report_path)
                .unwrap()
                .contains("Task ID: 1000")
        );
        assert!(fs::read_to_string(&csv_path).unwrap().starts_with(CSV_HEADER));
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.csv");

        assert!(matches!(
            write_csv(&path, &[]),
            Err(ReportError::WriteFailed { .. })
        ));
    }
}
