use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use common::models::TradeRecord;

pub struct TradesRepository;

impl TradesRepository {
    pub async fn insert(pool: &SqlitePool, trade: &TradeRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
                INSERT INTO trade_history (user_id, symbol, direction, entry, stop_loss, take_profit, executed_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(trade.user_id)
        .bind(&trade.symbol)
        .bind(&trade.direction)
        .bind(trade.entry)
        .bind(trade.stop_loss)
        .bind(trade.take_profit)
        .bind(trade.executed_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn recent(
        pool: &SqlitePool,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<TradeRecord>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (i64, String, String, f64, Option<f64>, Option<f64>, DateTime<Utc>)>(
            "SELECT user_id, symbol, direction, entry, stop_loss, take_profit, executed_at
             FROM trade_history WHERE user_id = ?
             ORDER BY executed_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(user_id, symbol, direction, entry, stop_loss, take_profit, executed_at)| {
                    TradeRecord {
                        user_id,
                        symbol,
                        direction,
                        entry,
                        stop_loss,
                        take_profit,
                        executed_at,
                    }
                },
            )
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn insert_and_list_newest_first() {
        let pool = db::connect_in_memory().await.unwrap();
        for (i, dir) in ["buy", "sell"].iter().enumerate() {
            let trade = TradeRecord {
                user_id: 1,
                symbol: "R_50".to_string(),
                direction: dir.to_string(),
                entry: 230.0 + i as f64,
                stop_loss: Some(228.0),
                take_profit: Some(234.0),
                executed_at: Utc::now() + chrono::Duration::seconds(i as i64),
            };
            TradesRepository::insert(&pool, &trade).await.unwrap();
        }

        let trades = TradesRepository::recent(&pool, 1, 10).await.unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].direction, "sell");

        let none = TradesRepository::recent(&pool, 2, 10).await.unwrap();
        assert!(none.is_empty());
    }
}
