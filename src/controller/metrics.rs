use axum::extract::Extension;
use axum::http::header;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Prometheus scrape endpoint
///
/// Renders the template counters (`template_list`, `template_create`,
/// `template_create_error`) and the `storage_error` counter labelled by
/// failure reason.
#[utoipa::path(
    operation_id = "metrics",
    get,
    path = "/metrics",
    responses(
        (
            status = 200,
            description = "Counters in the prometheus text exposition format.",
            body = String,
            content_type = "text/plain",
            example = json!("# TYPE storage_error counter\nstorage_error{reason=\"store_unavailable\"} 2\n"),
        ),
    )
)]
pub(super) async fn handler(
    Extension(handle): Extension<Arc<PrometheusHandle>>,
) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], handle.render())
}
