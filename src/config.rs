use anyhow::Result;
use dotenvy::dotenv;
use std::env;

const DEFAULT_FEED_URL: &str = "https://warnungen.zamg.at/wsapp/api/getWarnstatus";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feed_url: String,
    pub feed_timeout_secs: u64,
    pub update_interval_secs: u64,
    pub retention_days: i64,
    pub bind_address: String,
    pub database_url: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let feed_url = env::var("FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());
        let feed_timeout_secs = env::var("FEED_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);
        let update_interval_secs = env::var("UPDATE_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .unwrap_or(300);
        let retention_days = env::var("RETENTION_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        let bind_address = format!("{}:{}", host, port);

        let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let db_name = env::var("DB_DATABASE").unwrap_or_else(|_| "warnfeed".to_string());
        let db_user = env::var("DB_USER").unwrap_or_else(|_| "warnfeed".to_string());
        let db_pwd = env::var("DB_PWD").unwrap_or_else(|_| "warnfeed".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!(
                "postgres://{}:{}@{}:{}/{}",
                db_user, db_pwd, db_host, db_port, db_name
            )
        });

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            feed_url,
            feed_timeout_secs,
            update_interval_secs,
            retention_days,
            bind_address,
            database_url,
            log_level,
        })
    }
}
