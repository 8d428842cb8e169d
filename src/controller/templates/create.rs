use crate::error::ServerError;
use app_creator_prelude::Template;
use app_creator_storage::Storage;
use axum::body::Bytes;
use axum::extract::{Extension, Json};
use axum::http::StatusCode;

/// Create a template
///
/// Stores the template and echoes it back. Templates are immutable, submitting
/// an id that already exists fails.
#[utoipa::path(
    operation_id = "create_template",
    post,
    path = "/api/v1/templates",
    request_body(content = Template, content_type = "application/json"),
    responses(
        (status = 201, description = "The template has been stored.", body = Template),
        (status = 400, description = "The payload is not a valid template.", body = ServerError),
        (status = 500, description = "The template store failed.", body = ServerError),
    )
)]
pub(crate) async fn handler(
    Extension(storage): Extension<Storage>,
    body: Bytes,
) -> Result<(StatusCode, Json<Template>), ServerError> {
    metrics::counter!("template_create").increment(1);
    let template = Template::decode(&body)?;
    tracing::debug!("creating template {}", template.id);
    storage
        .put(template.clone())
        .await
        .inspect_err(|_| metrics::counter!("template_create_error").increment(1))?;
    Ok((StatusCode::CREATED, Json(template)))
}
