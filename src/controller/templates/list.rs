use crate::error::ServerError;
use app_creator_storage::Storage;
use axum::extract::Extension;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use bytes::{BufMut, BytesMut};

/// List the templates
///
/// Returns every stored template, in no particular order.
#[utoipa::path(
    operation_id = "list_templates",
    get,
    path = "/api/v1/templates",
    responses(
        (status = 200, description = "The stored templates.", body = [app_creator_prelude::Template]),
        (status = 500, description = "The template store failed.", body = ServerError),
    )
)]
pub(crate) async fn handler(
    Extension(storage): Extension<Storage>,
) -> Result<Response, ServerError> {
    metrics::counter!("template_list").increment(1);
    let templates = storage.list_all().await?;
    tracing::debug!("listing {} templates", templates.len());
    let mut writer = BytesMut::with_capacity(128).writer();
    app_creator_prelude::encode_collection(&templates, &mut writer)?;
    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        writer.into_inner().freeze(),
    )
        .into_response())
}
