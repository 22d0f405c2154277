// src/db/store.rs

use std::collections::HashMap;

use chrono::Utc;
use log::info;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use crate::db::models::{NewTrade, TradeRecord};
use crate::utils::errors::ApiError;

/// SQLite-backed persistence for trade history and per-user settings.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, ApiError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let db = Self { pool };
        db.ensure_schema().await?;
        info!("database ready at {database_url}");
        Ok(db)
    }

    async fn ensure_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trades (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol      TEXT    NOT NULL,
                side        TEXT    NOT NULL,
                order_type  TEXT    NOT NULL,
                quantity    REAL    NOT NULL,
                price       REAL,
                order_id    TEXT    NOT NULL,
                created_at  TEXT    NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_settings (
                user_id     TEXT NOT NULL,
                key         TEXT NOT NULL,
                value       TEXT NOT NULL,
                updated_at  TEXT NOT NULL,
                PRIMARY KEY (user_id, key)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn record_trade(&self, trade: &NewTrade) -> Result<i64, ApiError> {
        let result = sqlx::query(
            r#"
            INSERT INTO trades (symbol, side, order_type, quantity, price, order_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&trade.symbol)
        .bind(&trade.side)
        .bind(&trade.order_type)
        .bind(trade.quantity)
        .bind(trade.price)
        .bind(&trade.order_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Most recent trades first.
    pub async fn recent_trades(&self, limit: i64) -> Result<Vec<TradeRecord>, ApiError> {
        let trades = sqlx::query_as::<_, TradeRecord>(
            r#"
            SELECT id, symbol, side, order_type, quantity, price, order_id, created_at
            FROM trades
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(trades)
    }

    pub async fn user_settings(&self, user_id: &str) -> Result<HashMap<String, String>, ApiError> {
        let rows = sqlx::query(
            r#"SELECT key, value FROM user_settings WHERE user_id = ?"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut settings = HashMap::with_capacity(rows.len());
        for row in rows {
            settings.insert(row.try_get("key")?, row.try_get("value")?);
        }
        Ok(settings)
    }

    pub async fn update_user_setting(
        &self,
        user_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO user_settings (user_id, key, value, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, key) DO UPDATE
            SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
