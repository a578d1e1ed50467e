use chrono::{DateTime, Datelike, Utc};
use thiserror::Error;

use super::models::Subscription;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("end_date must be after start_date")]
pub struct InvalidRange;

/// Closed query interval used by the billing aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BillingRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidRange> {
        if end < start {
            return Err(InvalidRange);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn overlaps(&self, subscription: &Subscription) -> bool {
        subscription.start_date <= self.end && subscription.end_date >= self.start
    }

    /// Intersection of the subscription's active interval with this range.
    pub fn clip(&self, subscription: &Subscription) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            subscription.start_date.max(self.start),
            subscription.end_date.min(self.end),
        )
    }
}

// key: subs-aggregation -> whole calendar months
/// Counts calendar months from `from` to `to`; a trailing partial month is
/// dropped and the result never goes below zero.
pub fn months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    let years = i64::from(to.year()) - i64::from(from.year());
    let mut months = years * 12 + i64::from(to.month()) - i64::from(from.month());
    if to.day() < from.day() {
        months -= 1;
    }
    u32::try_from(months.max(0)).unwrap_or(u32::MAX)
}

/// Amount billed for one subscription inside `range`.
pub fn billed_amount(subscription: &Subscription, range: &BillingRange) -> u64 {
    if !range.overlaps(subscription) {
        return 0;
    }
    let (start, end) = range.clip(subscription);
    let months = u64::from(months_between(start, end));
    let price = u64::try_from(subscription.price).unwrap_or(0);
    months.saturating_mul(price)
}

// key: subs-aggregation -> period total
pub fn total_billed<'a, I>(subscriptions: I, range: &BillingRange) -> u64
where
    I: IntoIterator<Item = &'a Subscription>,
{
    subscriptions
        .into_iter()
        .map(|subscription| billed_amount(subscription, range))
        .fold(0u64, u64::saturating_add)
}
