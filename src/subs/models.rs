use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// key: subs-model -> user_subs row
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Candidate record as supplied by a caller. Absent fields keep their zero
/// value so the validator can report which one is missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionDraft {
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, deserialize_with = "rfc3339::deserialize_option")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "rfc3339::deserialize_option")]
    pub end_date: Option<DateTime<Utc>>,
}

/// A validated record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl NewSubscription {
    pub fn with_id(self, id: i64) -> Subscription {
        Subscription {
            id,
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Exact-match filters for the billing query. `None` means not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillingFilters {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

impl BillingFilters {
    /// Builds filters from raw query values, treating empty strings as absent.
    pub fn new(user_id: Option<String>, service_name: Option<String>) -> Self {
        Self {
            user_id: user_id.filter(|value| !value.is_empty()),
            service_name: service_name.filter(|value| !value.is_empty()),
        }
    }

    pub fn matches(&self, subscription: &Subscription) -> bool {
        let user_ok = self
            .user_id
            .as_deref()
            .map_or(true, |user_id| subscription.user_id == user_id);
        let service_ok = self
            .service_name
            .as_deref()
            .map_or(true, |name| subscription.service_name == name);
        user_ok && service_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionPage {
    pub subscriptions: Vec<Subscription>,
    pub total: i64,
}

pub mod rfc3339 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    /// Parses a strict RFC 3339 timestamp and normalises it to UTC.
    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw).map(|value| value.with_timezone(&Utc))
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|value| parse(&value).map_err(serde::de::Error::custom))
            .transpose()
    }
}
