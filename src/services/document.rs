//! Contract/invoice generation from `.docx` templates.
//!
//! A template is fetched whole, its `word/document.xml` body has its
//! placeholders resolved from a flat field map, and a brand-new package is
//! assembled for download. One template per call; callers sequence several.

pub mod fields;
pub mod package;
pub mod substitution;
pub mod template_source;

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

pub use fields::ReplacementMap;
pub use package::{fill_package, DOCX_CONTENT_TYPE};
pub use substitution::{substitute, SubstitutionOptions};
pub use template_source::{TemplateLocation, TemplateSource, TemplateSpec};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("could not fetch template {location}: {reason}")]
    Fetch { location: String, reason: String },
    #[error("template is not a valid .docx package: {0}")]
    MalformedPackage(String),
    #[error("template package has no {0} part")]
    MissingDocumentPart(&'static str),
    #[error("no replacement values were supplied")]
    EmptyReplacements,
    #[error("could not assemble the output package: {0}")]
    Assemble(String),
}

impl DocumentError {
    /// The template could not be reached.
    pub fn is_fetch(&self) -> bool {
        matches!(self, DocumentError::Fetch { .. })
    }

    /// The template was reached but is corrupt.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            DocumentError::MalformedPackage(_) | DocumentError::MissingDocumentPart(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl GeneratedDocument {
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }
}

fn docx_file_name(file_name: &str) -> String {
    let trimmed = file_name.trim();
    let stem = if trimmed.is_empty() { "document" } else { trimmed };
    if stem.to_ascii_lowercase().ends_with(".docx") {
        stem.to_string()
    } else {
        format!("{}.docx", stem)
    }
}

#[derive(Clone)]
pub struct DocumentEngine {
    source: TemplateSource,
    options: SubstitutionOptions,
}

impl DocumentEngine {
    pub fn new(source: TemplateSource, options: SubstitutionOptions) -> Self {
        Self { source, options }
    }

    /// Fetch one template, fill it and hand back the download.
    pub async fn render(
        &self,
        location: &TemplateLocation,
        replacements: &ReplacementMap,
        file_name: &str,
    ) -> Result<GeneratedDocument, DocumentError> {
        if replacements.is_empty() {
            return Err(DocumentError::EmptyReplacements);
        }

        let template = self.source.fetch(location).await?;
        let bytes = fill_package(&template, replacements, &self.options)?;

        let file_name = docx_file_name(file_name);
        log::info!(
            "Generated {} from {} ({} fields, {} bytes)",
            file_name,
            location,
            replacements.len(),
            bytes.len()
        );

        Ok(GeneratedDocument {
            file_name,
            content_type: DOCX_CONTENT_TYPE,
            bytes,
        })
    }
}
