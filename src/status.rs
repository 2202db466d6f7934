//! Overdue derivation for tasks.
//!
//! A task whose due date is strictly before today and which is not
//! completed is overdue. The check only ever moves a task *into*
//! `overdue`; it never clears it. It runs on every task write and never
//! on reads.

use chrono::{NaiveDate, Utc};

use crate::models::{Task, TaskStatus};

/// Current calendar date in UTC, the reference point for overdue checks.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Returns the corrected status for a task due on `due_date`.
pub fn evaluate(due_date: NaiveDate, status: TaskStatus, today: NaiveDate) -> TaskStatus {
    if due_date < today && status != TaskStatus::Completed {
        TaskStatus::Overdue
    } else {
        status
    }
}

impl Task {
    pub fn check_status(&mut self, today: NaiveDate) {
        self.status = evaluate(self.due_date, self.status, today);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn past_due_becomes_overdue_unless_completed() {
        let today = day("2024-05-10");
        let yesterday = today - Duration::days(1);

        assert_eq!(evaluate(yesterday, TaskStatus::Todo, today), TaskStatus::Overdue);
        assert_eq!(
            evaluate(yesterday, TaskStatus::InProgress, today),
            TaskStatus::Overdue
        );
        assert_eq!(
            evaluate(yesterday, TaskStatus::Completed, today),
            TaskStatus::Completed
        );
    }

    #[test]
    fn due_today_is_not_overdue() {
        let today = day("2024-05-10");
        assert_eq!(evaluate(today, TaskStatus::Todo, today), TaskStatus::Todo);
    }

    #[test]
    fn future_due_date_keeps_status() {
        let today = day("2024-05-10");
        let later = today + Duration::days(3);
        for status in TaskStatus::ALL {
            assert_eq!(evaluate(later, status, today), status);
        }
    }

    #[test]
    fn evaluation_is_idempotent() {
        let today = day("2024-05-10");
        for offset in [-30, -1, 0, 1, 30] {
            let due = today + Duration::days(offset);
            for status in TaskStatus::ALL {
                let once = evaluate(due, status, today);
                assert_eq!(evaluate(due, once, today), once);
            }
        }
    }

    #[test]
    fn completed_is_never_overridden() {
        let today = day("2024-05-10");
        for offset in [-365, -1, 0, 1] {
            let due = today + Duration::days(offset);
            assert_eq!(
                evaluate(due, TaskStatus::Completed, today),
                TaskStatus::Completed
            );
        }
    }

    #[test]
    fn check_status_rewrites_task_in_place() {
        let today = day("2024-05-10");
        let now = Utc::now();
        let mut task = Task {
            id: 1,
            title: "Write report".to_string(),
            description: None,
            due_date: day("2024-05-01"),
            status: TaskStatus::Todo,
            project_id: 1,
            created_at: now,
            updated_at: now,
        };
        task.check_status(today);
        assert_eq!(task.status, TaskStatus::Overdue);
    }
}
