use colored::*;
use jiff::civil::Date;

use crate::models::task::{Task, UNSET_PRIORITY};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// A pending task whose due date has passed
pub fn is_overdue(task: &Task, today: Date) -> bool {
    !task.is_done && task.due_date.is_some_and(|due| due < today)
}

/// Get the appropriate status glyph for a task
pub fn get_status_glyph(task: &Task, is_overdue: bool) -> ColoredString {
    if task.is_done {
        "✓".dimmed()
    } else if is_overdue {
        "●".red()
    } else {
        "○".normal()
    }
}

fn format_priority(priority: i32) -> String {
    if priority == UNSET_PRIORITY {
        String::from("-")
    } else {
        format!("P{}", priority)
    }
}

/// Right-hand column: priority, creation date and due date
pub fn get_task_details(task: &Task) -> String {
    let mut parts = vec![format_priority(task.priority), task.created_date.to_string()];
    if let Some(due) = task.due_date {
        parts.push(format!("due {}", due));
    }
    parts.join("  ·  ")
}

/// Render a single task line with ID, glyph, title, and right-aligned details
pub fn render_task_line(task: &Task, today: Date) {
    let terminal_width = get_terminal_width();
    let overdue = is_overdue(task, today);

    let id_str = format!("{:>5}", task.id);
    let glyph = get_status_glyph(task, overdue);
    let title = &task.title;

    let left_section = format!("  {}  {}  {}", id_str, glyph, title);

    let styled_left = if task.is_done {
        left_section.dimmed()
    } else {
        left_section.bold()
    };

    let right_section = get_task_details(task);
    let right_styled = if overdue {
        right_section.red()
    } else {
        right_section.dimmed()
    };

    let left_visible_len = format!("  {}  {}  {}", id_str, " ", title).chars().count();
    let total_content = left_visible_len + right_section.chars().count();

    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!("{}{}{}", styled_left, " ".repeat(padding), right_styled);
    } else {
        // Not enough space for right alignment, just print normally
        println!("{}  {}", styled_left, right_styled);
    }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize) {
    let task_word = if count == 1 { "task" } else { "tasks" };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, task_word);
}

/// Render a header and every task, or `empty_message` when there are none
pub fn render_task_list(title: &str, tasks: &[&Task], today: Date, empty_message: &str) {
    if tasks.is_empty() {
        println!("{}", empty_message);
        return;
    }

    render_view_header(title, tasks.len());
    for task in tasks {
        render_task_line(task, today);
    }
}

/// Footer with the size of the whole list, shown under filtered views
pub fn render_total_footer(total: usize) {
    println!("\n  {}", format!("{} in total", total).dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_is_overdue() {
        let today = date(2024, 6, 10);
        let due_yesterday = Task::new("Late").with_due_date(Some(date(2024, 6, 9)));
        let due_today = Task::new("Now").with_due_date(Some(today));
        let done_late = Task {
            is_done: true,
            ..due_yesterday.clone()
        };

        assert!(is_overdue(&due_yesterday, today));
        assert!(!is_overdue(&due_today, today));
        assert!(!is_overdue(&done_late, today));
        assert!(!is_overdue(&Task::new("Whenever"), today));
    }

    #[test]
    fn test_task_details() {
        let task = Task::new("Report")
            .with_created_date(date(2024, 1, 1))
            .with_priority(2)
            .with_due_date(Some(date(2024, 1, 3)));

        assert_eq!(get_task_details(&task), "P2  ·  2024-01-01  ·  due 2024-01-03");
        assert_eq!(
            get_task_details(&Task::new("Bare").with_created_date(date(2024, 1, 1))),
            "-  ·  2024-01-01"
        );
    }
}
