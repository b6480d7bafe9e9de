use sqlx::SqlitePool;

use common::models::UserPrefs;

pub struct PrefsRepository;

impl PrefsRepository {
    /// Missing users get the defaults without creating a row; rows are
    /// only written when the user changes something.
    pub async fn get(pool: &SqlitePool, user_id: i64) -> Result<UserPrefs, sqlx::Error> {
        let row = sqlx::query_as::<_, (i64, f64, f64, i64, String)>(
            "SELECT user_id, risk_percent, balance, alerts_enabled, timezone
             FROM user_prefs WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(match row {
            Some((user_id, risk_percent, balance, alerts_enabled, timezone)) => UserPrefs {
                user_id,
                risk_percent,
                balance,
                alerts_enabled: alerts_enabled != 0,
                timezone,
            },
            None => UserPrefs::new(user_id),
        })
    }

    pub async fn save(pool: &SqlitePool, prefs: &UserPrefs) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
                INSERT INTO user_prefs (user_id, risk_percent, balance, alerts_enabled, timezone)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(user_id) DO UPDATE SET
                    risk_percent = excluded.risk_percent,
                    balance = excluded.balance,
                    alerts_enabled = excluded.alerts_enabled,
                    timezone = excluded.timezone,
                    updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(prefs.user_id)
        .bind(prefs.risk_percent)
        .bind(prefs.balance)
        .bind(prefs.alerts_enabled as i64)
        .bind(&prefs.timezone)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn set_risk_percent(
        pool: &SqlitePool,
        user_id: i64,
        risk_percent: f64,
    ) -> Result<UserPrefs, sqlx::Error> {
        let mut prefs = Self::get(pool, user_id).await?;
        prefs.risk_percent = risk_percent;
        Self::save(pool, &prefs).await?;
        Ok(prefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn unknown_user_gets_defaults() {
        let pool = db::connect_in_memory().await.unwrap();
        let prefs = PrefsRepository::get(&pool, 42).await.unwrap();
        assert_eq!(prefs.balance, 10_000.0);
        assert_eq!(prefs.risk_percent, 1.0);
        assert!(!prefs.alerts_enabled);
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let pool = db::connect_in_memory().await.unwrap();
        let mut prefs = UserPrefs::new(7);
        prefs.risk_percent = 2.0;
        prefs.alerts_enabled = true;
        PrefsRepository::save(&pool, &prefs).await.unwrap();

        let loaded = PrefsRepository::get(&pool, 7).await.unwrap();
        assert_eq!(loaded.risk_percent, 2.0);
        assert!(loaded.alerts_enabled);
    }

    #[tokio::test]
    async fn set_risk_percent_upserts() {
        let pool = db::connect_in_memory().await.unwrap();
        let prefs = PrefsRepository::set_risk_percent(&pool, 9, 3.0).await.unwrap();
        assert_eq!(prefs.risk_percent, 3.0);

        let again = PrefsRepository::set_risk_percent(&pool, 9, 1.0).await.unwrap();
        assert_eq!(again.risk_percent, 1.0);
    }
}
