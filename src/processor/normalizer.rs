use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::error::RecordError;
use crate::models::feed::{RawFeature, WarningBatch};
use crate::models::warning::{Warning, WarningLevel, WarningType};

/// Normalize a single feed feature into a [`Warning`].
///
/// Dropped records (missing id, malformed or out-of-range timestamps) come
/// back as `Err`; unknown type/level codes stay in the record as `None`.
pub fn normalize(feature: &Value, now: DateTime<Utc>) -> Result<Warning, RecordError> {
    let raw: RawFeature = serde_json::from_value(feature.clone())
        .map_err(|e| RecordError::Malformed(e.to_string()))?;

    let warning_id = raw.properties.warnid.ok_or(RecordError::MissingId)?;

    // Absent timestamps follow the feed convention of epoch zero.
    let start_time = epoch_to_utc(raw.properties.start.unwrap_or(0))?;
    let end_time = epoch_to_utc(raw.properties.end.unwrap_or(0))?;

    Ok(Warning {
        warning_id,
        warning_type: raw.properties.wtype.and_then(WarningType::from_code),
        warning_level: raw.properties.wlevel.and_then(WarningLevel::from_code),
        start_time,
        end_time,
        geometry: raw.geometry,
        municipalities: raw.properties.gemeinden,
        raw_data: Some(feature.clone()),
        created_at: now,
        updated_at: now,
    })
}

/// Normalize a whole fetched batch, skipping and logging bad records.
pub fn normalize_batch(batch: &WarningBatch) -> Vec<Warning> {
    let now = Utc::now();
    let mut warnings = Vec::with_capacity(batch.len());
    for feature in &batch.features {
        match normalize(feature, now) {
            Ok(warning) => warnings.push(warning),
            Err(e) => warn!(error = %e, "Dropping warning record"),
        }
    }
    warnings
}

fn epoch_to_utc(secs: i64) -> Result<DateTime<Utc>, RecordError> {
    DateTime::from_timestamp(secs, 0).ok_or(RecordError::InvalidTimestamp(secs))
}
