use crate::error::AppError;
use crate::metrics::{
    DateRange, EfficiencySnapshot, GoalProgress, TaskStats, Window, compute_snapshot,
    compute_stats,
};
use crate::storage::{JsonStore, TaskStore};
use serde::Serialize;
use time::{OffsetDateTime, UtcOffset, Weekday};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowReport {
    pub window: Window,
    pub range: Option<DateRange>,
    #[serde(flatten)]
    pub snapshot: EfficiencySnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalReport {
    pub snapshot: EfficiencySnapshot,
    pub goal: GoalProgress,
}

pub fn daily_report(owner: &str) -> Result<WindowReport, AppError> {
    window_report(owner, Window::Daily, Weekday::Sunday)
}

pub fn weekly_report(owner: &str, week_start: Weekday) -> Result<WindowReport, AppError> {
    window_report(owner, Window::Weekly, week_start)
}

pub fn overall_report(owner: &str) -> Result<WindowReport, AppError> {
    window_report(owner, Window::Overall, Weekday::Sunday)
}

pub fn window_report(
    owner: &str,
    window: Window,
    week_start: Weekday,
) -> Result<WindowReport, AppError> {
    let store = JsonStore::from_env()?;
    window_report_with_store(&store, owner, window, local_now(), week_start)
}

pub fn stats_report(owner: &str) -> Result<TaskStats, AppError> {
    let store = JsonStore::from_env()?;
    stats_report_with_store(&store, owner)
}

pub fn goal_report(owner: &str, target: f64) -> Result<GoalReport, AppError> {
    let store = JsonStore::from_env()?;
    goal_report_with_store(&store, owner, target)
}

pub fn window_report_with_store(
    store: &dyn TaskStore,
    owner: &str,
    window: Window,
    now: OffsetDateTime,
    week_start: Weekday,
) -> Result<WindowReport, AppError> {
    let range = window.range(now, week_start);
    let tasks = store.find_tasks(owner, range.as_ref())?;
    let snapshot = compute_snapshot(&tasks);

    debug!(%window, tasks = tasks.len(), efficiency = snapshot.efficiency, "window report");
    Ok(WindowReport {
        window,
        range,
        snapshot,
    })
}

pub fn stats_report_with_store(
    store: &dyn TaskStore,
    owner: &str,
) -> Result<TaskStats, AppError> {
    let tasks = store.find_tasks(owner, None)?;
    Ok(compute_stats(&tasks))
}

pub fn goal_report_with_store(
    store: &dyn TaskStore,
    owner: &str,
    target: f64,
) -> Result<GoalReport, AppError> {
    let tasks = store.find_tasks(owner, None)?;
    let snapshot = compute_snapshot(&tasks);
    Ok(GoalReport {
        snapshot,
        goal: GoalProgress::evaluate(snapshot.efficiency, target),
    })
}

/// Current time in the local offset as of this instant.
fn local_now() -> OffsetDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset)
}

#[cfg(test)]
mod tests {
    use super::{goal_report_with_store, stats_report_with_store, window_report_with_store};
    use crate::error::AppError;
    use crate::metrics::{DateRange, Window};
    use crate::model::test_support::task_created_at;
    use crate::model::{Task, TaskStatus};
    use crate::storage::TaskStore;
    use std::cell::RefCell;
    use time::Weekday;
    use time::macros::datetime;

    struct MemoryStore {
        tasks: Vec<Task>,
        requested: RefCell<Vec<Option<DateRange>>>,
    }

    impl MemoryStore {
        fn new(tasks: Vec<Task>) -> Self {
            Self {
                tasks,
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl TaskStore for MemoryStore {
        fn find_tasks(
            &self,
            owner_id: &str,
            range: Option<&DateRange>,
        ) -> Result<Vec<Task>, AppError> {
            self.requested.borrow_mut().push(range.copied());
            Ok(self
                .tasks
                .iter()
                .filter(|task| task.owner_id == owner_id)
                .filter(|task| range.is_none_or(|range| range.contains(task.created_at)))
                .cloned()
                .collect())
        }
    }

    struct FailingStore;

    impl TaskStore for FailingStore {
        fn find_tasks(
            &self,
            _owner_id: &str,
            _range: Option<&DateRange>,
        ) -> Result<Vec<Task>, AppError> {
            Err(AppError::io("disk unavailable"))
        }
    }

    fn sample_store() -> MemoryStore {
        MemoryStore::new(vec![
            // Wednesday, inside today's window.
            task_created_at(
                "today-done",
                60,
                50,
                TaskStatus::Completed,
                datetime!(2025-12-17 09:00 UTC),
            ),
            task_created_at(
                "today-open",
                30,
                0,
                TaskStatus::Pending,
                datetime!(2025-12-17 11:00 UTC),
            ),
            // Monday, same week.
            task_created_at(
                "monday",
                40,
                60,
                TaskStatus::Completed,
                datetime!(2025-12-15 09:00 UTC),
            ),
            // Previous week.
            task_created_at(
                "last-week",
                70,
                10,
                TaskStatus::InProgress,
                datetime!(2025-12-10 09:00 UTC),
            ),
        ])
    }

    const NOW: time::OffsetDateTime = datetime!(2025-12-17 15:00 UTC);

    #[test]
    fn daily_report_covers_today_only() {
        let store = sample_store();

        let report =
            window_report_with_store(&store, "user-1", Window::Daily, NOW, Weekday::Sunday)
                .unwrap();

        assert_eq!(report.snapshot.total_tasks, 2);
        assert_eq!(report.snapshot.total_planned_time, 90);
        assert_eq!(report.snapshot.efficiency, 55.56);
        let range = report.range.unwrap();
        assert_eq!(range.start, datetime!(2025-12-17 00:00 UTC));
    }

    #[test]
    fn weekly_report_covers_the_current_week() {
        let store = sample_store();

        let report =
            window_report_with_store(&store, "user-1", Window::Weekly, NOW, Weekday::Sunday)
                .unwrap();

        assert_eq!(report.snapshot.total_tasks, 3);
        assert_eq!(report.snapshot.completed_tasks, 2);
        assert_eq!(report.snapshot.total_planned_time, 130);
        assert_eq!(report.snapshot.efficiency, 84.62);
    }

    #[test]
    fn overall_report_asks_the_store_without_a_range() {
        let store = sample_store();

        let report =
            window_report_with_store(&store, "user-1", Window::Overall, NOW, Weekday::Sunday)
                .unwrap();

        assert_eq!(report.snapshot.total_tasks, 4);
        assert_eq!(report.range, None);
        assert_eq!(store.requested.borrow().as_slice(), &[None::<DateRange>]);
    }

    #[test]
    fn reports_are_scoped_to_the_owner() {
        let store = sample_store();

        let report =
            window_report_with_store(&store, "user-2", Window::Overall, NOW, Weekday::Sunday)
                .unwrap();

        assert_eq!(report.snapshot.total_tasks, 0);
        assert_eq!(report.snapshot.efficiency, 0.0);
    }

    #[test]
    fn stats_report_adds_partitions_to_overall() {
        let store = sample_store();

        let stats = stats_report_with_store(&store, "user-1").unwrap();

        assert_eq!(stats.snapshot.total_tasks, 4);
        assert_eq!(stats.pending_tasks, 1);
        assert_eq!(stats.in_progress_tasks, 1);
        assert_eq!(stats.medium_priority_tasks, 4);
        assert_eq!(stats.snapshot.efficiency, 55.0);
    }

    #[test]
    fn goal_report_uses_overall_efficiency() {
        let store = sample_store();

        let report = goal_report_with_store(&store, "user-1", 80.0).unwrap();

        assert_eq!(report.snapshot.efficiency, 55.0);
        assert!(!report.goal.achieved);
        assert!((report.goal.progress - 68.75).abs() < 1e-9);
        assert!((report.goal.gap - 31.25).abs() < 1e-9);
    }

    #[test]
    fn store_failure_is_surfaced_before_aggregation() {
        let err = window_report_with_store(
            &FailingStore,
            "user-1",
            Window::Daily,
            NOW,
            Weekday::Sunday,
        )
        .unwrap_err();

        assert_eq!(err.code(), "io_error");
        assert!(stats_report_with_store(&FailingStore, "user-1").is_err());
        assert!(goal_report_with_store(&FailingStore, "user-1", 80.0).is_err());
    }

    #[test]
    fn report_serializes_flat_with_range() {
        let store = sample_store();
        let report =
            window_report_with_store(&store, "user-1", Window::Daily, NOW, Weekday::Sunday)
                .unwrap();

        let json = serde_json::to_value(report).unwrap();

        assert_eq!(json["window"], "daily");
        assert_eq!(json["range"]["start"], "2025-12-17T00:00:00Z");
        assert_eq!(json["total_tasks"], 2);
    }
}
