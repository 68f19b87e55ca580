mod task;

pub use task::{Priority, Task, TaskStatus};

use crate::error::AppError;
use time::Date;
use time::macros::format_description;

/// Parse a `YYYY-MM-DD` calendar date as entered for a due date.
pub fn parse_due_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input("due date must be YYYY-MM-DD"))
}
