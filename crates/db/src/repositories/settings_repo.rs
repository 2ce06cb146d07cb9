//! Repository for the `system_settings` table.

use sqlx::PgPool;

use crate::models::setting::SystemSetting;

const COLUMNS: &str = "key, value, updated_at";

pub struct SettingsRepo;

impl SettingsRepo {
    pub async fn get(pool: &PgPool, key: &str) -> Result<Option<SystemSetting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM system_settings WHERE key = $1");
        sqlx::query_as::<_, SystemSetting>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace a section.
    pub async fn upsert(
        pool: &PgPool,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<SystemSetting, sqlx::Error> {
        let query = format!(
            "INSERT INTO system_settings (key, value)
             VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SystemSetting>(&query)
            .bind(key)
            .bind(value)
            .fetch_one(pool)
            .await
    }
}
