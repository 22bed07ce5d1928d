//! Pure, client-side projections over a task list: filtering and
//! dashboard-style summaries. Nothing here touches the network or mutates
//! the underlying list.

use chrono::{DateTime, Utc};

use super::types::{Priority, Status, Task};

/// Client-side filter criteria. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    /// Exact subject match
    pub subject: Option<String>,

    /// Exact priority match
    pub priority: Option<Priority>,

    /// Exact status match
    pub status: Option<Status>,

    /// Case-insensitive substring search over title and description
    pub search: Option<String>,
}

impl TaskFilters {
    /// Whether a single task satisfies every set criterion
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(subject) = &self.subject {
            if &task.subject != subject {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_title = task.title.to_lowercase().contains(&needle);
            let in_description = task
                .description
                .as_ref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }

    /// Project the matching tasks out of a list, preserving order
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}

/// Derived summary over a task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
    /// Past due and not completed
    pub overdue: usize,
    /// Completed share, as a whole percentage; zero for an empty list
    pub completion_rate: u32,
    /// Open tasks by priority
    pub open_high: usize,
    pub open_medium: usize,
    pub open_low: usize,
}

impl TaskStats {
    /// Compute the summary as of `now`
    pub fn collect(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.status == Status::Completed).count();
        let pending = tasks.iter().filter(|t| t.status == Status::Pending).count();
        let in_progress = tasks
            .iter()
            .filter(|t| t.status == Status::InProgress)
            .count();
        let overdue = tasks
            .iter()
            .filter(|t| t.due_date < now && t.status != Status::Completed)
            .count();

        let completion_rate = if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };

        let open = |p: Priority| {
            tasks
                .iter()
                .filter(|t| t.priority == p && t.status != Status::Completed)
                .count()
        };

        Self {
            total,
            completed,
            pending,
            in_progress,
            overdue,
            completion_rate,
            open_high: open(Priority::High),
            open_medium: open(Priority::Medium),
            open_low: open(Priority::Low),
        }
    }
}

/// The next `limit` open tasks, soonest due date first
pub fn upcoming(tasks: &[Task], limit: usize) -> Vec<Task> {
    let mut open: Vec<Task> = tasks
        .iter()
        .filter(|t| t.status != Status::Completed)
        .cloned()
        .collect();
    open.sort_by_key(|t| t.due_date);
    open.truncate(limit);
    open
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task(id: &str, subject: &str, status: Status, priority: Priority) -> Task {
        let now = Utc::now();
        Task {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            title: format!("{} homework", subject),
            description: None,
            subject: subject.to_string(),
            priority,
            status,
            due_date: now + Duration::days(1),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_filter_selects_exactly_the_matching_task() {
        let tasks = vec![
            task("1", "Math", Status::Pending, Priority::Medium),
            task("2", "History", Status::Completed, Priority::Low),
        ];

        let filters = TaskFilters {
            status: Some(Status::Completed),
            ..Default::default()
        };
        let result = filters.apply(&tasks);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].subject, "History");
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let mut with_description = task("2", "History", Status::Pending, Priority::Low);
        with_description.description = Some("Covers the MATH of ballistics".to_string());
        let tasks = vec![
            task("1", "Math", Status::Pending, Priority::Medium),
            with_description,
        ];

        let filters = TaskFilters {
            search: Some("math".to_string()),
            ..Default::default()
        };
        let result = filters.apply(&tasks);
        assert_eq!(result.len(), 2);

        let filters = TaskFilters {
            search: Some("ballistics".to_string()),
            ..Default::default()
        };
        let result = filters.apply(&tasks);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "2");
    }

    #[test]
    fn filters_do_not_mutate_the_source_list() {
        let tasks = vec![
            task("1", "Math", Status::Pending, Priority::Medium),
            task("2", "History", Status::Completed, Priority::Low),
        ];
        let before = tasks.clone();

        let filters = TaskFilters {
            subject: Some("Math".to_string()),
            priority: Some(Priority::Medium),
            ..Default::default()
        };
        let _ = filters.apply(&tasks);
        assert_eq!(tasks, before);
    }

    #[test]
    fn stats_count_status_buckets_and_overdue() {
        let now = Utc::now();
        let mut overdue = task("1", "Math", Status::Pending, Priority::High);
        overdue.due_date = now - Duration::days(1);
        let tasks = vec![
            overdue,
            task("2", "History", Status::Completed, Priority::Low),
            task("3", "Physics", Status::InProgress, Priority::Medium),
            task("4", "Physics", Status::Pending, Priority::High),
        ];

        let stats = TaskStats::collect(&tasks, now);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.completion_rate, 25);
        assert_eq!(stats.open_high, 2);
        assert_eq!(stats.open_medium, 1);
        assert_eq!(stats.open_low, 0);
    }

    #[test]
    fn upcoming_orders_open_tasks_by_due_date() {
        let now = Utc::now();
        let mut soon = task("1", "Math", Status::Pending, Priority::High);
        soon.due_date = now + Duration::hours(1);
        let mut later = task("2", "History", Status::InProgress, Priority::Low);
        later.due_date = now + Duration::days(3);
        let done = task("3", "Physics", Status::Completed, Priority::Low);

        let result = upcoming(&[later.clone(), done, soon.clone()], 5);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "1");
        assert_eq!(result[1].id, "2");
    }
}
