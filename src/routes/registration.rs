use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{registration::RegistrationSubmission, selection::Quote};
use crate::routes::AppState;
use crate::services::registration_service::{DocumentPayload, RegistrationService};
use crate::services::tour_repository::TourRepository;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub submission_id: Uuid,
    pub quote: Quote,
    pub documents: Vec<DocumentPayload>,
}

/*
    /api/registrations
*/
pub async fn submit<R: TourRepository + 'static>(
    state: web::Data<AppState<R>>,
    input: web::Json<RegistrationSubmission>,
) -> Result<HttpResponse, ApiError> {
    let today = Utc::now().date_naive();
    let outcome = RegistrationService::submit(
        &state.repository,
        &state.engine,
        &state.templates,
        input.into_inner(),
        today,
    )
    .await?;

    Ok(HttpResponse::Ok().json(RegistrationResponse {
        submission_id: outcome.submission_id,
        quote: outcome.quote,
        documents: RegistrationService::payloads(&state.templates, &outcome.documents),
    }))
}
