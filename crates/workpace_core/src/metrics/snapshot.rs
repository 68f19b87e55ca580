use crate::model::Task;
use serde::{Deserialize, Serialize};

/// Planned vs. actual totals for one set of tasks.
///
/// A snapshot has no identity and is never stored; callers recompute it from
/// a fresh task read every time it is requested.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencySnapshot {
    pub total_planned_time: u64,
    pub total_actual_time: u64,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    /// Percentage, rounded to two decimals. Not bounded to 100.
    pub efficiency: f64,
}

/// Reduce a task set to an [`EfficiencySnapshot`].
///
/// The input is expected to be already narrowed to one owner and one window.
/// Efficiency is the actual time of *completed* tasks divided by the planned
/// time of *all* tasks, so open tasks only weigh on the denominator. An empty
/// set, or one with no planned time at all, reports an efficiency of 0.
pub fn compute_snapshot(tasks: &[Task]) -> EfficiencySnapshot {
    let mut snapshot = EfficiencySnapshot::default();
    let mut completed_actual_time: u64 = 0;

    for task in tasks {
        snapshot.total_planned_time += u64::from(task.planned_time);
        snapshot.total_actual_time += u64::from(task.actual_time);
        snapshot.total_tasks += 1;

        if task.is_completed() {
            snapshot.completed_tasks += 1;
            completed_actual_time += u64::from(task.actual_time);
        }
    }

    snapshot.efficiency = efficiency(completed_actual_time, snapshot.total_planned_time);
    snapshot
}

fn efficiency(completed_actual_time: u64, total_planned_time: u64) -> f64 {
    if total_planned_time == 0 {
        return 0.0;
    }

    round2(completed_actual_time as f64 / total_planned_time as f64 * 100.0)
}

/// Round to two decimals, halves away from zero.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
