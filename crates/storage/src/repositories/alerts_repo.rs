use sqlx::SqlitePool;

use common::models::{AlertSubscription, Timeframe};

pub struct AlertsRepository;

impl AlertsRepository {
    /// Idempotent: subscribing twice to the same symbol/timeframe is a no-op.
    pub async fn subscribe(
        pool: &SqlitePool,
        sub: &AlertSubscription,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT OR IGNORE INTO signal_alerts (chat_id, symbol, timeframe) VALUES (?, ?, ?)",
        )
        .bind(sub.chat_id)
        .bind(&sub.symbol)
        .bind(sub.timeframe.label())
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn unsubscribe(
        pool: &SqlitePool,
        chat_id: i64,
        symbol: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM signal_alerts WHERE chat_id = ? AND symbol = ?")
            .bind(chat_id)
            .bind(symbol)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<AlertSubscription>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT chat_id, symbol, timeframe FROM signal_alerts ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(chat_id, symbol, timeframe)| AlertSubscription {
                chat_id,
                symbol,
                timeframe: timeframe.parse::<Timeframe>().unwrap_or_default(),
            })
            .collect())
    }

    pub async fn list_for_chat(
        pool: &SqlitePool,
        chat_id: i64,
    ) -> Result<Vec<AlertSubscription>, sqlx::Error> {
        Ok(Self::list_all(pool)
            .await?
            .into_iter()
            .filter(|s| s.chat_id == chat_id)
            .collect())
    }
}
