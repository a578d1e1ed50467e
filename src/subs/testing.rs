use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::aggregation::BillingRange;
use super::error::StorageError;
use super::models::{BillingFilters, NewSubscription, Subscription, SubscriptionPage};
use super::store::SubscriptionStore;

#[derive(Default)]
struct StoreState {
    records: BTreeMap<i64, Subscription>,
    last_id: i64,
    failure: Option<String>,
}

impl StoreState {
    fn check(&self) -> Result<(), StorageError> {
        match &self.failure {
            Some(message) => Err(StorageError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

/// In-memory store with the same id and not-found semantics as Postgres.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    state: Mutex<StoreState>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with [`StorageError::Unavailable`].
    pub async fn fail_with(&self, message: impl Into<String>) {
        self.state.lock().await.failure = Some(message.into());
    }

    pub async fn recover(&self) {
        self.state.lock().await.failure = None;
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn create(&self, record: &NewSubscription) -> Result<Subscription, StorageError> {
        let mut guard = self.state.lock().await;
        guard.check()?;
        guard.last_id += 1;
        let created = record.clone().with_id(guard.last_id);
        guard.records.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Subscription>, StorageError> {
        let guard = self.state.lock().await;
        guard.check()?;
        Ok(guard.records.get(&id).cloned())
    }

    async fn update(&self, record: &Subscription) -> Result<Option<Subscription>, StorageError> {
        let mut guard = self.state.lock().await;
        guard.check()?;
        match guard.records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let mut guard = self.state.lock().await;
        guard.check()?;
        Ok(guard.records.remove(&id).is_some())
    }

    async fn list_all(&self) -> Result<Vec<Subscription>, StorageError> {
        let guard = self.state.lock().await;
        guard.check()?;
        Ok(guard.records.values().cloned().collect())
    }

    async fn list_page(&self, limit: i64, offset: i64) -> Result<SubscriptionPage, StorageError> {
        let guard = self.state.lock().await;
        guard.check()?;
        let skip = usize::try_from(offset).unwrap_or(0);
        let take = usize::try_from(limit).unwrap_or(0);
        let subscriptions = guard
            .records
            .values()
            .skip(skip)
            .take(take)
            .cloned()
            .collect();
        Ok(SubscriptionPage {
            subscriptions,
            total: guard.records.len() as i64,
        })
    }

    async fn find_overlapping(
        &self,
        range: &BillingRange,
        filters: &BillingFilters,
    ) -> Result<Vec<Subscription>, StorageError> {
        let guard = self.state.lock().await;
        guard.check()?;
        Ok(guard
            .records
            .values()
            .filter(|record| range.overlaps(record) && filters.matches(record))
            .cloned()
            .collect())
    }
}
