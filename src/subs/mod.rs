pub mod aggregation;
pub mod api;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod testing;
pub mod validation;

pub use aggregation::{billed_amount, months_between, total_billed, BillingRange, InvalidRange};
pub use api::{
    create_subscription, delete_subscription, get_subscription, list_subscriptions,
    total_for_period, update_subscription, ListQuery, Pagination, TotalQuery,
};
pub use error::{StorageError, SubscriptionError, SubscriptionResult};
pub use models::{
    BillingFilters, NewSubscription, Subscription, SubscriptionDraft, SubscriptionPage,
};
pub use service::SubscriptionService;
pub use store::{PgSubscriptionStore, SubscriptionStore};
pub use testing::InMemorySubscriptionStore;
pub use validation::{validate_for_create, validate_for_update, ValidationError};
