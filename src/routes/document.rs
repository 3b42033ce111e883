use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web, HttpResponse,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::AppState;
use crate::services::document::{ReplacementMap, TemplateSpec};
use crate::services::tour_repository::TourRepository;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub replacements: ReplacementMap,
    #[serde(default)]
    pub file_name: Option<String>,
}

/*
    /api/documents/{template}
*/
pub async fn generate<R: TourRepository + 'static>(
    state: web::Data<AppState<R>>,
    path: web::Path<String>,
    input: web::Json<DocumentRequest>,
) -> Result<HttpResponse, ApiError> {
    let key = path.into_inner();
    let template = TemplateSpec::lookup(&state.templates, &key)
        .ok_or_else(|| ApiError::TemplateNotFound(key.clone()))?;

    let request = input.into_inner();
    let file_name = request.file_name.as_deref().unwrap_or(&template.file_name);
    let document = state
        .engine
        .render(&template.location, &request.replacements, file_name)
        .await
        .map_err(|source| ApiError::Document {
            template: key.clone(),
            source,
        })?;

    Ok(HttpResponse::Ok()
        .content_type(document.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(document.file_name)],
        })
        .body(document.bytes))
}
