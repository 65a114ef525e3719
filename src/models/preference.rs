use chrono::{DateTime, Utc};
use serde::Serialize;

use super::warning::WarningType;

/// A user's warning-type subscription. An empty `warning_types` set means
/// no filtering: every warning is visible.
#[derive(Debug, Clone, Serialize)]
pub struct UserPreference {
    pub user_id: String,
    pub warning_types: Vec<WarningType>,
    pub updated_at: DateTime<Utc>,
}
