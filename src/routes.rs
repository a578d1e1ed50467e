use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::trace::TraceLayer;

use crate::subs::{self, SubscriptionService};

async fn root() -> &'static str {
    "Subscriptions API"
}

pub fn api_routes() -> Router {
    Router::new()
        .route(
            "/subs",
            post(subs::create_subscription).get(subs::list_subscriptions),
        )
        .route("/subs/total", get(subs::total_for_period))
        .route(
            "/subs/:id",
            get(subs::get_subscription)
                .put(subs::update_subscription)
                .delete(subs::delete_subscription),
        )
}

/// Full application router around an injected service.
pub fn app(service: SubscriptionService) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(service))
}
