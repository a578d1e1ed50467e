use async_trait::async_trait;
use sqlx::PgPool;

use super::aggregation::BillingRange;
use super::error::StorageError;
use super::models::{BillingFilters, NewSubscription, Subscription, SubscriptionPage};

// key: subs-store -> persistence capability set
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn create(&self, record: &NewSubscription) -> Result<Subscription, StorageError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Subscription>, StorageError>;

    /// Overwrites every field of an existing record. `None` when the id is unknown.
    async fn update(&self, record: &Subscription) -> Result<Option<Subscription>, StorageError>;

    /// Returns `false` when no record had that id.
    async fn delete(&self, id: i64) -> Result<bool, StorageError>;

    async fn list_all(&self) -> Result<Vec<Subscription>, StorageError>;

    async fn list_page(&self, limit: i64, offset: i64) -> Result<SubscriptionPage, StorageError>;

    async fn find_overlapping(
        &self,
        range: &BillingRange,
        filters: &BillingFilters,
    ) -> Result<Vec<Subscription>, StorageError>;
}

const SELECT_COLUMNS: &str = "id, service_name, price, user_id, start_date, end_date";

/// Postgres-backed store over the `user_subs` table.
#[derive(Clone)]
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn create(&self, record: &NewSubscription) -> Result<Subscription, StorageError> {
        let row = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            INSERT INTO user_subs (service_name, price, user_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(&record.service_name)
        .bind(record.price)
        .bind(&record.user_id)
        .bind(record.start_date)
        .bind(record.end_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Subscription>, StorageError> {
        let row = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SELECT_COLUMNS} FROM user_subs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, record: &Subscription) -> Result<Option<Subscription>, StorageError> {
        let row = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            UPDATE user_subs
            SET service_name = $2,
                price = $3,
                user_id = $4,
                start_date = $5,
                end_date = $6
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(record.id)
        .bind(&record.service_name)
        .bind(record.price)
        .bind(&record.user_id)
        .bind(record.start_date)
        .bind(record.end_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM user_subs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<Subscription>, StorageError> {
        let rows = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SELECT_COLUMNS} FROM user_subs ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_page(&self, limit: i64, offset: i64) -> Result<SubscriptionPage, StorageError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_subs")
            .fetch_one(&self.pool)
            .await?;
        let subscriptions = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SELECT_COLUMNS} FROM user_subs ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(SubscriptionPage {
            subscriptions,
            total,
        })
    }

    async fn find_overlapping(
        &self,
        range: &BillingRange,
        filters: &BillingFilters,
    ) -> Result<Vec<Subscription>, StorageError> {
        let rows = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM user_subs
            WHERE start_date <= $1
              AND end_date >= $2
              AND ($3::TEXT IS NULL OR user_id = $3)
              AND ($4::TEXT IS NULL OR service_name = $4)
            ORDER BY id
            "#
        ))
        .bind(range.end())
        .bind(range.start())
        .bind(filters.user_id.as_deref())
        .bind(filters.service_name.as_deref())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
