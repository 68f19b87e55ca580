use super::snapshot::{EfficiencySnapshot, compute_snapshot, round2};
use crate::model::{Priority, Task, TaskStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskStats {
    #[serde(flatten)]
    pub snapshot: EfficiencySnapshot,
    pub in_progress_tasks: usize,
    pub pending_tasks: usize,
    pub high_priority_tasks: usize,
    pub medium_priority_tasks: usize,
    pub low_priority_tasks: usize,
    /// Share of tasks completed, in percent. 0 for an empty set.
    pub completion_rate: f64,
}

pub fn compute_stats(tasks: &[Task]) -> TaskStats {
    let mut stats = TaskStats {
        snapshot: compute_snapshot(tasks),
        ..TaskStats::default()
    };

    for task in tasks {
        match task.status {
            TaskStatus::Pending => stats.pending_tasks += 1,
            TaskStatus::InProgress => stats.in_progress_tasks += 1,
            TaskStatus::Completed => {}
        }

        match task.priority {
            Priority::High => stats.high_priority_tasks += 1,
            Priority::Medium => stats.medium_priority_tasks += 1,
            Priority::Low => stats.low_priority_tasks += 1,
        }
    }

    stats.completion_rate = completion_rate(stats.snapshot.completed_tasks, tasks.len());
    stats
}

fn completion_rate(completed_tasks: usize, total_tasks: usize) -> f64 {
    if total_tasks == 0 {
        return 0.0;
    }

    round2(completed_tasks as f64 / total_tasks as f64 * 100.0)
}
