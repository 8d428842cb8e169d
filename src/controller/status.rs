use axum::http::StatusCode;

/// Check the status of the service
///
/// If the service is running, it returns a 204.
#[utoipa::path(
    operation_id = "status",
    head,
    path = "/status",
    responses(
        (status = 204, description = "The service is running."),
    )
)]
pub(super) async fn handler() -> StatusCode {
    metrics::counter!("status_check").increment(1);
    StatusCode::NO_CONTENT
}
