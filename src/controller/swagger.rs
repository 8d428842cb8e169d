use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(title = "app-creator"),
    paths(
        super::metrics::handler,
        super::status::handler,
        super::templates::list::handler,
        super::templates::create::handler,
    ),
    components(schemas(crate::error::ServerError, app_creator_prelude::Template))
)]
pub(crate) struct ApiDoc;

pub(crate) fn service() -> SwaggerUi {
    SwaggerUi::new("/swagger").url("/openapi.json", ApiDoc::openapi())
}
