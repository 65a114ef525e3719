use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::{error, info, warn};

use crate::db::{queries, DbPool};
use crate::error::StoreError;
use crate::models::preference::UserPreference;
use crate::models::warning::{Warning, WarningLevel, WarningType};
use crate::processor::filter;

/// Counts for one successful save cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveSummary {
    pub saved: usize,
    pub archived: u64,
    pub purged: u64,
}

/// Persistence layer over the three warning collections.
///
/// The current partition is replaced wholesale on every save; the
/// historical partition only ever sees appends and age-based deletes.
#[derive(Clone)]
pub struct WarningStore {
    pool: DbPool,
    retention_days: i64,
}

impl WarningStore {
    pub fn new(pool: DbPool, retention_days: i64) -> Self {
        Self {
            pool,
            retention_days,
        }
    }

    /// Archive the current partition into historical, then replace it with
    /// `warnings`, all in one transaction. Returns `None` for an empty
    /// batch (no-op), otherwise the save counts.
    ///
    /// On success, historical records older than the retention window are
    /// purged; a purge failure is logged but does not fail the save.
    pub async fn save_warnings(
        &self,
        warnings: &[Warning],
    ) -> Result<Option<SaveSummary>, StoreError> {
        if warnings.is_empty() {
            warn!("No warnings to save after processing");
            return Ok(None);
        }

        let mut tx = self.pool.begin().await?;

        let archived = sqlx::query(queries::ARCHIVE_CURRENT)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query(queries::CLEAR_CURRENT).execute(&mut *tx).await?;

        for w in warnings {
            sqlx::query(queries::INSERT_CURRENT)
                .bind(&w.warning_id)
                .bind(w.warning_type.map(|t| t.as_str()))
                .bind(w.warning_level.map(|l| l.as_str()))
                .bind(w.start_time)
                .bind(w.end_time)
                .bind(w.geometry.as_ref().map(Json))
                .bind(&w.municipalities)
                .bind(w.raw_data.as_ref().map(Json))
                .bind(w.created_at)
                .bind(w.updated_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let purged = self.purge_historical().await;

        let summary = SaveSummary {
            saved: warnings.len(),
            archived,
            purged,
        };
        info!(
            saved = summary.saved,
            archived = summary.archived,
            purged = summary.purged,
            "Replaced current warning set"
        );
        Ok(Some(summary))
    }

    async fn purge_historical(&self) -> u64 {
        let cutoff = Utc::now() - Duration::days(self.retention_days);
        match sqlx::query(queries::PURGE_HISTORICAL)
            .bind(cutoff)
            .execute(&self.pool)
            .await
        {
            Ok(result) => result.rows_affected(),
            Err(e) => {
                error!(error = %e, "Failed to purge expired historical warnings");
                0
            }
        }
    }

    /// Current warnings whose window contains now, inclusive on both ends.
    /// `raw_data` is never selected on read paths.
    pub async fn get_active_warnings(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<Warning>, StoreError> {
        let now = Utc::now();
        let rows: Vec<WarningRow> = sqlx::query_as(queries::SELECT_ACTIVE)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;
        let warnings = rows.into_iter().map(Warning::from).collect();
        self.apply_preferences(warnings, user_id).await
    }

    /// Historical warnings created within the last `days` days, newest
    /// first.
    pub async fn get_historical_warnings(
        &self,
        days: i64,
        user_id: Option<&str>,
    ) -> Result<Vec<Warning>, StoreError> {
        let cutoff = Utc::now() - Duration::days(days);
        let rows: Vec<WarningRow> = sqlx::query_as(queries::SELECT_HISTORICAL)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;
        let warnings = rows.into_iter().map(Warning::from).collect();
        self.apply_preferences(warnings, user_id).await
    }

    pub async fn get_preferences(
        &self,
        user_id: &str,
    ) -> Result<Option<UserPreference>, StoreError> {
        let row: Option<PreferenceRow> = sqlx::query_as(queries::SELECT_PREFERENCES)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(UserPreference::from))
    }

    pub async fn update_preferences(
        &self,
        user_id: &str,
        warning_types: &[WarningType],
    ) -> Result<(), StoreError> {
        let names: Vec<String> = warning_types
            .iter()
            .map(|t| t.as_str().to_string())
            .collect();
        sqlx::query(queries::UPSERT_PREFERENCES)
            .bind(user_id)
            .bind(&names)
            .execute(&self.pool)
            .await?;
        info!(user_id, types = names.len(), "Updated user preferences");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn apply_preferences(
        &self,
        warnings: Vec<Warning>,
        user_id: Option<&str>,
    ) -> Result<Vec<Warning>, StoreError> {
        let Some(user_id) = user_id else {
            return Ok(warnings);
        };
        let allowed = self
            .get_preferences(user_id)
            .await?
            .map(|p| p.warning_types)
            .unwrap_or_default();
        Ok(filter::filter_by_types(warnings, &allowed))
    }
}

#[derive(FromRow)]
struct WarningRow {
    warning_id: String,
    warning_type: Option<String>,
    warning_level: Option<String>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    geometry: Option<Json<Value>>,
    municipalities: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WarningRow> for Warning {
    fn from(row: WarningRow) -> Self {
        Warning {
            warning_id: row.warning_id,
            warning_type: row.warning_type.as_deref().and_then(WarningType::from_name),
            warning_level: row
                .warning_level
                .as_deref()
                .and_then(WarningLevel::from_name),
            start_time: row.start_time,
            end_time: row.end_time,
            geometry: row.geometry.map(|j| j.0),
            municipalities: row.municipalities,
            raw_data: None,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct PreferenceRow {
    user_id: String,
    warning_types: Vec<String>,
    updated_at: DateTime<Utc>,
}

impl From<PreferenceRow> for UserPreference {
    fn from(row: PreferenceRow) -> Self {
        UserPreference {
            user_id: row.user_id,
            // Unknown names in storage are skipped rather than rejected.
            warning_types: row
                .warning_types
                .iter()
                .filter_map(|n| WarningType::from_name(n))
                .collect(),
            updated_at: row.updated_at,
        }
    }
}

// These run against a live database via #[sqlx::test], which applies the
// migrations into a fresh schema per test.
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::PgPool;

    fn warning(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Warning {
        let now = Utc::now();
        Warning {
            warning_id: id.to_string(),
            warning_type: Some(WarningType::Storm),
            warning_level: Some(WarningLevel::Red),
            start_time: start,
            end_time: end,
            geometry: Some(json!({"type": "Point", "coordinates": [16.37, 48.21]})),
            municipalities: vec!["90001".to_string()],
            raw_data: Some(json!({"properties": {"warnid": id}})),
            created_at: now,
            updated_at: now,
        }
    }

    fn batch(ids: &[&str]) -> Vec<Warning> {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let end = DateTime::from_timestamp(1_700_003_600, 0).unwrap();
        ids.iter().map(|id| warning(id, start, end)).collect()
    }

    async fn count(pool: &PgPool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn test_save_twice_keeps_one_current_row_per_id(pool: PgPool) {
        let store = WarningStore::new(pool.clone(), 30);
        let warnings = batch(&["w1", "w2", "w3"]);

        let first = store.save_warnings(&warnings).await.unwrap().unwrap();
        assert_eq!(first.saved, 3);
        assert_eq!(first.archived, 0);

        let second = store.save_warnings(&warnings).await.unwrap().unwrap();
        assert_eq!(second.saved, 3);
        assert_eq!(second.archived, 3);

        assert_eq!(count(&pool, "current_warnings").await, 3);
        assert_eq!(count(&pool, "historical_warnings").await, 3);
    }

    #[sqlx::test]
    async fn test_active_window_is_inclusive_on_both_ends(pool: PgPool) {
        let store = WarningStore::new(pool.clone(), 30);
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let end = DateTime::from_timestamp(1_700_003_600, 0).unwrap();
        store
            .save_warnings(&[warning("w1", start, end)])
            .await
            .unwrap();

        let active_at = |t: DateTime<Utc>| {
            let pool = pool.clone();
            async move {
                let rows: Vec<WarningRow> = sqlx::query_as(queries::SELECT_ACTIVE)
                    .bind(t)
                    .fetch_all(&pool)
                    .await
                    .unwrap();
                rows.into_iter().map(Warning::from).collect::<Vec<_>>()
            }
        };

        let at_start = active_at(start).await;
        assert_eq!(at_start.len(), 1);
        assert_eq!(at_start[0].warning_id, "w1");
        assert_eq!(at_start[0].warning_type, Some(WarningType::Storm));
        assert_eq!(at_start[0].warning_level, Some(WarningLevel::Red));
        assert_eq!(at_start[0].start_time, start);
        assert_eq!(at_start[0].end_time, end);
        assert!(at_start[0].raw_data.is_none());

        assert_eq!(active_at(end).await.len(), 1);
        assert!(active_at(start - Duration::seconds(1)).await.is_empty());
        assert!(active_at(end + Duration::seconds(1)).await.is_empty());
    }

    #[sqlx::test]
    async fn test_purge_keeps_rows_inside_retention_window(pool: PgPool) {
        let store = WarningStore::new(pool.clone(), 30);
        let seed = |id: &str, age_days: i64| {
            let pool = pool.clone();
            let id = id.to_string();
            async move {
                let created = Utc::now() - Duration::days(age_days);
                sqlx::query(
                    "INSERT INTO historical_warnings \
                     (warning_id, start_time, end_time, created_at, updated_at) \
                     VALUES ($1, $2, $2, $2, $2)",
                )
                .bind(id)
                .bind(created)
                .execute(&pool)
                .await
                .unwrap();
            }
        };
        seed("expired", 31).await;
        seed("retained", 29).await;

        // The purge runs as part of a successful save cycle.
        store.save_warnings(&batch(&["w1"])).await.unwrap();

        let remaining: Vec<String> =
            sqlx::query_scalar("SELECT warning_id FROM historical_warnings ORDER BY warning_id")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(remaining, vec!["retained"]);
    }

    #[sqlx::test]
    async fn test_preferences_filter_reads_per_user(pool: PgPool) {
        let store = WarningStore::new(pool.clone(), 30);
        let now = Utc::now();
        let mut warnings = vec![
            warning("w-storm", now - Duration::hours(1), now + Duration::hours(1)),
            warning("w-rain", now - Duration::hours(1), now + Duration::hours(1)),
        ];
        warnings[1].warning_type = Some(WarningType::Rain);
        store.save_warnings(&warnings).await.unwrap();

        store
            .update_preferences("user-1", &[WarningType::Storm])
            .await
            .unwrap();

        let filtered = store.get_active_warnings(Some("user-1")).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].warning_id, "w-storm");

        // A user with no preference document sees everything.
        let unfiltered = store.get_active_warnings(Some("user-2")).await.unwrap();
        assert_eq!(unfiltered.len(), 2);
    }
}
