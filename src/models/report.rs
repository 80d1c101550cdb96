use serde::{Deserialize, Serialize};

/// Structured result of one ingestion run. `success` is false only when the
/// cycle record itself could not be resolved; per-query and per-insert
/// failures accumulate in `errors` while the run continues.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub success: bool,
    pub cycle_id: Option<String>,
    pub articles_inserted: u32,
    pub errors: Vec<String>,
}

impl RunReport {
    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            success: false,
            cycle_id: None,
            articles_inserted: 0,
            errors,
        }
    }
}
