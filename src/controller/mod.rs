pub(crate) mod metrics;
pub(crate) mod status;
pub(crate) mod swagger;
pub(crate) mod templates;

use axum::http::StatusCode;
use axum::routing::{get, head, Router};

pub(crate) const TEMPLATES_PATH: &str = "/api/v1/templates";

/// Methods other than the registered ones get a `405 Method Not Allowed`
/// from the method router itself. HEAD is registered explicitly because axum
/// would otherwise answer it with the GET handler.
pub(crate) fn create() -> Router {
    Router::new()
        .route("/status", head(status::handler))
        .route("/metrics", get(metrics::handler))
        .route(
            TEMPLATES_PATH,
            get(templates::list::handler)
                .post(templates::create::handler)
                .head(method_not_allowed),
        )
        .merge(swagger::service())
}

async fn method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}
