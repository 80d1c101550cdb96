use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One weekly publication cycle (Sunday through Saturday). At most one
/// cycle is active at any time; the website only renders the active one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsCycle {
    pub id: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub is_active: bool,
}
