use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::models::{rfc3339, BillingFilters, Subscription, SubscriptionDraft};
use super::service::SubscriptionService;
use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

// key: subs-api -> rest endpoints
pub async fn create_subscription(
    Extension(service): Extension<SubscriptionService>,
    payload: Result<Json<SubscriptionDraft>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Subscription>)> {
    let Json(draft) = payload.map_err(bad_json)?;
    let created = service.create(&draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_subscription(
    Extension(service): Extension<SubscriptionService>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Subscription>> {
    let id = parse_id(&raw_id)?;
    Ok(Json(service.get_by_id(id).await?))
}

pub async fn update_subscription(
    Extension(service): Extension<SubscriptionService>,
    Path(raw_id): Path<String>,
    payload: Result<Json<SubscriptionDraft>, JsonRejection>,
) -> AppResult<Json<Subscription>> {
    let id = parse_id(&raw_id)?;
    let Json(draft) = payload.map_err(bad_json)?;
    Ok(Json(service.update(id, &draft).await?))
}

pub async fn delete_subscription(
    Extension(service): Extension<SubscriptionService>,
    Path(raw_id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&raw_id)?;
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_subscriptions(
    Extension(service): Extension<SubscriptionService>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let Some(pagination) = Pagination::from_query(&query) else {
        let all = service.list().await?;
        return Ok(Json(all).into_response());
    };

    let page = service
        .list_page(pagination.limit, pagination.offset())
        .await?;
    Ok(Json(PagedSubscriptions {
        subscriptions: page.subscriptions,
        pagination: PaginationMeta {
            page: pagination.page,
            limit: pagination.limit,
            total: page.total,
        },
    })
    .into_response())
}

pub async fn total_for_period(
    Extension(service): Extension<SubscriptionService>,
    Query(query): Query<TotalQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let start = required_date(query.start_date.as_deref(), "start_date")?;
    let end = required_date(query.end_date.as_deref(), "end_date")?;
    let filters = BillingFilters::new(query.user_id, query.service_name);
    let total = service.total_billed_amount(start, end, &filters).await?;
    Ok(Json(json!({ "total": total })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TotalQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

/// Page selection resolved from lenient query values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// `None` when the caller asked for neither `page` nor `limit`; empty
    /// values count as absent. Unparsable or out-of-range values fall back
    /// to the defaults.
    pub fn from_query(query: &ListQuery) -> Option<Self> {
        let raw_page = non_empty(query.page.as_deref());
        let raw_limit = non_empty(query.limit.as_deref());
        if raw_page.is_none() && raw_limit.is_none() {
            return None;
        }
        let page = raw_page
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1);
        let limit = raw_limit
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|limit| (1..=MAX_PAGE_LIMIT).contains(limit))
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        Some(Self { page, limit })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Serialize)]
pub struct PagedSubscriptions {
    pub subscriptions: Vec<Subscription>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.trim().is_empty())
}

fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse::<u64>()
        .ok()
        .and_then(|id| i64::try_from(id).ok())
        .ok_or_else(|| AppError::BadRequest("invalid id".to_string()))
}

fn required_date(raw: Option<&str>, field: &str) -> AppResult<chrono::DateTime<chrono::Utc>> {
    let raw = raw
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{field} is required")))?;
    rfc3339::parse(raw)
        .map_err(|_| AppError::BadRequest(format!("invalid {field} format, expected RFC3339")))
}

fn bad_json(rejection: JsonRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}
