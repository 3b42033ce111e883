use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::models::selection::SelectionState;
use crate::routes::AppState;
use crate::services::{pricing_service::PricingService, tour_repository::TourRepository};

/*
    /api/tours
*/
pub async fn list_tours<R: TourRepository + 'static>(
    state: web::Data<AppState<R>>,
) -> Result<HttpResponse, ApiError> {
    let tours = state.repository.list_tours().await?;
    Ok(HttpResponse::Ok().json(tours))
}

/*
    /api/tours/{tour_id}/rate-card
*/
pub async fn get_rate_card<R: TourRepository + 'static>(
    state: web::Data<AppState<R>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let tour_id = path.into_inner();
    let tour = state
        .repository
        .find_tour(&tour_id)
        .await?
        .ok_or(ApiError::TourNotFound(tour_id))?;
    Ok(HttpResponse::Ok().json(tour.customize_options))
}

/*
    /api/tours/{tour_id}/quote
*/
pub async fn quote<R: TourRepository + 'static>(
    state: web::Data<AppState<R>>,
    path: web::Path<String>,
    input: web::Json<SelectionState>,
) -> Result<HttpResponse, ApiError> {
    let tour_id = path.into_inner();
    let tour = state
        .repository
        .find_tour(&tour_id)
        .await?
        .ok_or(ApiError::TourNotFound(tour_id))?;

    let selection = input.into_inner().normalized();
    let quote = PricingService::quote(&tour.customize_options, &selection);
    Ok(HttpResponse::Ok().json(quote))
}
