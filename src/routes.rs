pub mod document;
pub mod health;
pub mod registration;
pub mod tour;

use actix_web::web;

use crate::services::{
    document::{DocumentEngine, TemplateSpec},
    tour_repository::TourRepository,
};

/// Shared, read-only state handed to every handler.
pub struct AppState<R> {
    pub repository: R,
    pub engine: DocumentEngine,
    pub templates: Vec<TemplateSpec>,
}

impl<R: TourRepository> AppState<R> {
    pub fn new(repository: R, engine: DocumentEngine, templates: Vec<TemplateSpec>) -> Self {
        Self {
            repository,
            engine,
            templates,
        }
    }
}

pub fn configure<R: TourRepository + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check::<R>))
        .service(
            web::scope("/api")
                .route("/tours", web::get().to(tour::list_tours::<R>))
                .route(
                    "/tours/{tour_id}/rate-card",
                    web::get().to(tour::get_rate_card::<R>),
                )
                .route("/tours/{tour_id}/quote", web::post().to(tour::quote::<R>))
                .route(
                    "/registrations",
                    web::post().to(registration::submit::<R>),
                )
                .route(
                    "/documents/{template}",
                    web::post().to(document::generate::<R>),
                ),
        );
}
