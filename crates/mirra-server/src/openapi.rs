use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mirra API",
        version = "0.1.0",
        description = "Profile lookups across public mirror instances with failover and retry."
    ),
    paths(crate::routes::scrape, crate::routes::health),
    components(schemas(
        crate::dto::ScrapeRequest,
        crate::dto::ScrapeResponse,
        crate::dto::ProfileResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "scrape", description = "Profile lookups"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
