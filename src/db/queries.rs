pub const ARCHIVE_CURRENT: &str = r#"
INSERT INTO historical_warnings (
    warning_id, warning_type, warning_level, start_time, end_time,
    geometry, municipalities, raw_data, created_at, updated_at
)
SELECT warning_id, warning_type, warning_level, start_time, end_time,
       geometry, municipalities, raw_data, created_at, updated_at
FROM current_warnings;
"#;

pub const CLEAR_CURRENT: &str = r#"
DELETE FROM current_warnings;
"#;

pub const INSERT_CURRENT: &str = r#"
INSERT INTO current_warnings (
    warning_id, warning_type, warning_level, start_time, end_time,
    geometry, municipalities, raw_data, created_at, updated_at
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
ON CONFLICT (warning_id) DO NOTHING;
"#;

pub const PURGE_HISTORICAL: &str = r#"
DELETE FROM historical_warnings WHERE created_at < $1;
"#;

pub const SELECT_ACTIVE: &str = r#"
SELECT warning_id, warning_type, warning_level, start_time, end_time,
       geometry, municipalities, created_at, updated_at
FROM current_warnings
WHERE start_time <= $1 AND end_time >= $1
ORDER BY start_time;
"#;

pub const SELECT_HISTORICAL: &str = r#"
SELECT warning_id, warning_type, warning_level, start_time, end_time,
       geometry, municipalities, created_at, updated_at
FROM historical_warnings
WHERE created_at >= $1
ORDER BY created_at DESC;
"#;

pub const SELECT_PREFERENCES: &str = r#"
SELECT user_id, warning_types, updated_at FROM user_preferences WHERE user_id = $1;
"#;

pub const UPSERT_PREFERENCES: &str = r#"
INSERT INTO user_preferences (user_id, warning_types, updated_at)
VALUES ($1, $2, NOW())
ON CONFLICT (user_id) DO UPDATE
SET warning_types = $2,
    updated_at = NOW();
"#;
