use app_creator_prelude::{DecodeError, EncodeError};
use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value as JsonValue;
use std::borrow::Cow;

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub(crate) struct ServerError {
    #[serde(skip)]
    code: StatusCode,
    #[schema(value_type = String)]
    pub message: Cow<'static, str>,
    #[schema(value_type = Object)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl ServerError {
    pub(crate) fn internal() -> Self {
        Self {
            code: StatusCode::INTERNAL_SERVER_ERROR,
            message: Cow::Borrowed("Internal Server Error"),
            details: None,
        }
    }

    pub(crate) fn bad_request(message: &'static str) -> Self {
        Self {
            code: StatusCode::BAD_REQUEST,
            message: Cow::Borrowed(message),
            details: None,
        }
    }

    pub(crate) fn details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    #[cfg(test)]
    pub(crate) fn code(&self) -> StatusCode {
        self.code
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        (self.code, Json(self)).into_response()
    }
}

impl From<DecodeError> for ServerError {
    fn from(error: DecodeError) -> Self {
        metrics::counter!("server_error", "origin" => "decode").increment(1);
        tracing::debug!("invalid template payload: {:?}", error);
        ServerError::bad_request("invalid template payload").details(serde_json::json!({
            "origin": "template",
            "description": error.to_string(),
        }))
    }
}

impl From<EncodeError> for ServerError {
    fn from(error: EncodeError) -> Self {
        metrics::counter!("server_error", "origin" => "encode").increment(1);
        tracing::error!("unable to encode templates: {:?}", error);
        ServerError::internal()
    }
}

impl From<app_creator_storage::Error> for ServerError {
    fn from(error: app_creator_storage::Error) -> Self {
        metrics::counter!("server_error", "origin" => "storage").increment(1);
        tracing::error!("storage error: {:?}", error);
        ServerError::internal()
    }
}
