//! Efficiency aggregation.
//!
//! Window selection and status/priority partitioning are plain filters that
//! run before the single reduction in [`compute_snapshot`], so every report
//! shares one efficiency formula.

mod goal;
mod snapshot;
mod stats;
mod window;

pub use goal::{DEFAULT_TARGET_EFFICIENCY, GoalProgress, GoalStanding, clamp_target};
pub use snapshot::{EfficiencySnapshot, compute_snapshot};
pub use stats::{TaskStats, compute_stats};
pub use window::{DateRange, Window, parse_weekday, select};
