use async_trait::async_trait;
use chrono::Utc;

use super::SqliteRepository;
use super::mapping::{map_value_row, value_columns};
use crate::repository::{KeyValueStore, StorageError, StoredValue};

const UPSERT_SQL: &str = r"
    INSERT INTO key_values (key, kind, int_value, timestamp_value, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(key) DO UPDATE SET
        kind = excluded.kind,
        int_value = excluded.int_value,
        timestamp_value = excluded.timestamp_value,
        updated_at = excluded.updated_at
";

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl KeyValueStore for SqliteRepository {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT kind, int_value, timestamp_value
                FROM key_values
                WHERE key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_value_row).transpose()
    }

    async fn set(&self, key: &str, value: StoredValue) -> Result<(), StorageError> {
        let (kind, int_value, timestamp_value) = value_columns(value);
        sqlx::query(UPSERT_SQL)
            .bind(key)
            .bind(kind)
            .bind(int_value)
            .bind(timestamp_value)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, StoredValue)]) -> Result<(), StorageError> {
        let updated_at = Utc::now();
        let mut tx = self.pool.begin().await.map_err(conn)?;

        for (key, value) in entries {
            let (kind, int_value, timestamp_value) = value_columns(*value);
            sqlx::query(UPSERT_SQL)
                .bind(*key)
                .bind(kind)
                .bind(int_value)
                .bind(timestamp_value)
                .bind(updated_at)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
