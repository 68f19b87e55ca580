pub mod json_store;

pub use json_store::JsonStore;

use crate::error::AppError;
use crate::metrics::DateRange;
use crate::model::Task;

/// Read access to persisted tasks.
///
/// Implementations return only tasks owned by `owner_id`, restricted to
/// `range` over `created_at` when one is given. Order is unspecified.
pub trait TaskStore {
    fn find_tasks(&self, owner_id: &str, range: Option<&DateRange>)
    -> Result<Vec<Task>, AppError>;
}
