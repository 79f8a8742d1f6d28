use actix_web::{HttpRequest, web};

use crate::{
    domain::{id::Generator, repository::MappingStore},
    handler::handlers::{Handler, HandlerError, ShortenParams},
};

/// Registers every route. The caller provides `web::Data<Handler<G, S>>` as app data.
pub fn configure<G, S>(cfg: &mut web::ServiceConfig)
where
    G: Generator + 'static,
    S: MappingStore + 'static,
{
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        HandlerError::ParamError(format!("Invalid JSON body: {}", err)).into()
    }))
    // Exact paths, not a scope: "/health" itself must still reach "/{id}".
    .route(
        "/health/readyz",
        web::get().to(|handler: web::Data<Handler<G, S>>| async move {
            handler.readyz().await
        }),
    )
    .route(
        "/health/livez",
        web::get().to(|handler: web::Data<Handler<G, S>>| async move {
            handler.livez().await
        }),
    )
    .route(
        "/shorten",
        web::post().to(
            |handler: web::Data<Handler<G, S>>,
             req: HttpRequest,
             info: web::Json<ShortenParams>| async move { handler.shorten(req, info).await },
        ),
    )
    .route(
        "/{id}",
        web::get().to(
            |handler: web::Data<Handler<G, S>>, req: HttpRequest, path: web::Path<String>| async move {
                handler.redirect(req, path).await
            },
        ),
    );
}
