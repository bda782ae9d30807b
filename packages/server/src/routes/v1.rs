use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/media", media_routes(config))
        .nest("/content", content_routes())
}

fn media_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::media::list_media,
            handlers::media::upload_images
        ))
        .routes(routes!(
            handlers::media::get_media,
            handlers::media::delete_media
        ))
        .layer(handlers::media::upload_body_limit(
            config.media.max_upload_size,
        ))
}

fn content_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::content::get_homepage_content))
        .routes(routes!(handlers::content::put_section))
}
