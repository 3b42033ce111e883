use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{registration::RegistrationSubmission, selection::Quote};
use crate::services::document::{DocumentEngine, GeneratedDocument, TemplateSpec};
use crate::services::pricing_service::PricingService;
use crate::services::tour_repository::TourRepository;

pub struct SubmissionOutcome {
    pub submission_id: Uuid,
    pub quote: Quote,
    pub documents: Vec<GeneratedDocument>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    pub template: String,
    pub file_name: String,
    pub content_type: String,
    pub data: String,
}

pub struct RegistrationService;

impl RegistrationService {
    /// Price the selection and generate every configured document.
    ///
    /// Templates are processed in order; the first failure aborts the rest
    /// and nothing generated so far is returned.
    pub async fn submit<R: TourRepository>(
        repository: &R,
        engine: &DocumentEngine,
        templates: &[TemplateSpec],
        submission: RegistrationSubmission,
        today: NaiveDate,
    ) -> Result<SubmissionOutcome, ApiError> {
        let submission_id = Uuid::new_v4();
        let mut submission = submission;
        submission.selection = submission.selection.normalized();
        submission.validate().map_err(ApiError::InvalidSubmission)?;

        let tour = repository
            .find_tour(&submission.tour_id)
            .await?
            .ok_or_else(|| ApiError::TourNotFound(submission.tour_id.clone()))?;

        let quote = PricingService::quote(&tour.customize_options, &submission.selection);
        let replacements = submission.replacement_map(&tour, &quote, today);
        log::info!(
            "[{}] Registration for {} by {}: total {} for {} participant(s)",
            submission_id,
            tour.id,
            submission.organization.name,
            quote.total_price,
            quote.participant_count
        );

        let mut documents = Vec::with_capacity(templates.len());
        for template in templates {
            match engine
                .render(&template.location, &replacements, &template.file_name)
                .await
            {
                Ok(document) => documents.push(document),
                Err(source) => {
                    log::error!(
                        "[{}] Template {} failed, aborting submission: {}",
                        submission_id,
                        template.key,
                        source
                    );
                    return Err(ApiError::Document {
                        template: template.key.clone(),
                        source,
                    });
                }
            }
        }

        Ok(SubmissionOutcome {
            submission_id,
            quote,
            documents,
        })
    }

    pub fn payloads(templates: &[TemplateSpec], documents: &[GeneratedDocument]) -> Vec<DocumentPayload> {
        templates
            .iter()
            .zip(documents)
            .map(|(template, document)| DocumentPayload {
                template: template.key.clone(),
                file_name: document.file_name.clone(),
                content_type: document.content_type.to_string(),
                data: document.to_base64(),
            })
            .collect()
    }
}
