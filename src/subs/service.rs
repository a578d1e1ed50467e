use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::aggregation::{total_billed, BillingRange};
use super::error::{StorageError, SubscriptionError, SubscriptionResult};
use super::models::{BillingFilters, Subscription, SubscriptionDraft, SubscriptionPage};
use super::store::SubscriptionStore;
use super::validation::{validate_for_create, validate_for_update};

// key: subs-service -> validation, storage, aggregation
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: &SubscriptionDraft) -> SubscriptionResult<Subscription> {
        let record = validate_for_create(draft).map_err(|err| {
            warn!(rule = err.rule(), "rejected subscription create");
            err
        })?;
        let created = self.store.create(&record).await.map_err(storage_failure)?;
        info!(
            subscription_id = created.id,
            user_id = %created.user_id,
            service_name = %created.service_name,
            "subscription created"
        );
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i64) -> SubscriptionResult<Subscription> {
        match self.store.get_by_id(id).await.map_err(storage_failure)? {
            Some(record) => Ok(record),
            None => {
                warn!(subscription_id = id, "subscription not found");
                Err(SubscriptionError::NotFound(id))
            }
        }
    }

    /// Replaces every field of the record identified by `id`.
    pub async fn update(
        &self,
        id: i64,
        draft: &SubscriptionDraft,
    ) -> SubscriptionResult<Subscription> {
        let record = validate_for_update(Some(id), draft).map_err(|err| {
            warn!(subscription_id = id, rule = err.rule(), "rejected subscription update");
            err
        })?;
        match self.store.update(&record).await.map_err(storage_failure)? {
            Some(updated) => {
                info!(subscription_id = id, "subscription updated");
                Ok(updated)
            }
            None => {
                warn!(subscription_id = id, "subscription not found for update");
                Err(SubscriptionError::NotFound(id))
            }
        }
    }

    pub async fn delete(&self, id: i64) -> SubscriptionResult<()> {
        if self.store.delete(id).await.map_err(storage_failure)? {
            info!(subscription_id = id, "subscription deleted");
            Ok(())
        } else {
            warn!(subscription_id = id, "subscription not found for delete");
            Err(SubscriptionError::NotFound(id))
        }
    }

    pub async fn list(&self) -> SubscriptionResult<Vec<Subscription>> {
        let records = self.store.list_all().await.map_err(storage_failure)?;
        info!(count = records.len(), "listed subscriptions");
        Ok(records)
    }

    /// `limit` and `offset` are expected to be sanitised by the caller.
    pub async fn list_page(&self, limit: i64, offset: i64) -> SubscriptionResult<SubscriptionPage> {
        let page = self
            .store
            .list_page(limit, offset)
            .await
            .map_err(storage_failure)?;
        info!(
            count = page.subscriptions.len(),
            total = page.total,
            limit,
            offset,
            "listed subscription page"
        );
        Ok(page)
    }

    // key: subs-service -> billed total for a period
    pub async fn total_billed_amount(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        filters: &BillingFilters,
    ) -> SubscriptionResult<u64> {
        let range = BillingRange::new(range_start, range_end).map_err(|err| {
            warn!(%range_start, %range_end, "rejected billing range");
            err
        })?;
        let matching = self
            .store
            .find_overlapping(&range, filters)
            .await
            .map_err(storage_failure)?;
        let total = total_billed(&matching, &range);
        info!(
            %range_start,
            %range_end,
            user_id = filters.user_id.as_deref().unwrap_or(""),
            service_name = filters.service_name.as_deref().unwrap_or(""),
            matched = matching.len(),
            total,
            "calculated billed total"
        );
        Ok(total)
    }
}

fn storage_failure(err: StorageError) -> SubscriptionError {
    error!(?err, "subscription storage failure");
    SubscriptionError::Storage(err)
}
