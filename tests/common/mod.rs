#![allow(dead_code)]

use actix_web::{web, App};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use tempfile::TempDir;
use zip::{write::SimpleFileOptions, ZipArchive, ZipWriter};

use tourbroker_api::routes::{self, AppState};
use tourbroker_api::services::document::{
    DocumentEngine, SubstitutionOptions, TemplateLocation, TemplateSource, TemplateSpec,
};
use tourbroker_api::services::tour_repository::StaticTourRepository;

pub const TOUR_ID: &str = "mekong-2026";

pub const CATALOG: &str = r#"[
    {
        "id": "mekong-2026",
        "name": "Mekong Delta Study Tour",
        "customizeOptions": [
            {"key": "north", "name": "Northern leg", "description": "Can Tho and Chau Doc",
             "price": {"earlyBird": {"regular": 500, "returning": 450},
                       "standard": {"regular": 600, "returning": 540}}},
            {"key": "south", "name": "Southern leg",
             "price": {"earlyBird": {"regular": 400, "returning": 360},
                       "standard": {"regular": 480, "returning": 430}}},
            {"key": "grandTotal", "name": "Full programme",
             "price": {"earlyBird": {"regular": 900, "returning": 800},
                       "standard": {"regular": 1100, "returning": 1000}}}
        ]
    },
    {"id": "empty-tour", "name": "Coming soon", "customizeOptions": []}
]"#;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

pub const DOCUMENT_PART: &str = "word/document.xml";

/// Document body with one `<w:p>` per entry and one run per string.
pub fn body(paragraphs: &[&[&str]]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );
    for runs in paragraphs {
        xml.push_str("<w:p>");
        for text in runs.iter() {
            xml.push_str(&format!(
                r#"<w:r><w:rPr><w:lang w:val="vi-VN"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
                text
            ));
        }
        xml.push_str("</w:p>");
    }
    xml.push_str("</w:body></w:document>");
    xml
}

pub fn docx(document_xml: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer.write_all(CONTENT_TYPES.as_bytes()).unwrap();
    writer.start_file(DOCUMENT_PART, options).unwrap();
    writer.write_all(document_xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn document_xml(package: &[u8]) -> String {
    let mut archive = ZipArchive::new(Cursor::new(package)).unwrap();
    let mut part = archive.by_name(DOCUMENT_PART).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

pub fn contract_template() -> Vec<u8> {
    docx(&body(&[
        &["Hợp đồng / Contract with ", "[", "ORGANIZATION_NAME", "]"],
        &["Phone/Điện thoại: undefined"],
        &["Email: {email}"],
        &["Position/Chức vụ: undefined"],
        &["Reference: [UNKNOWN_FIELD]"],
    ]))
}

pub fn invoice_template() -> Vec<u8> {
    docx(&body(&[
        &["Package: [PACKAGE_SELECTION]"],
        &["Participants: {PARTICIPANTS}"],
        &["Total/Tổng cộng: [TOTAL_PRICE", "] USD"],
    ]))
}

pub fn registration_json() -> serde_json::Value {
    serde_json::json!({
        "tourId": TOUR_ID,
        "contact": {
            "fullName": "Nguyen Van A",
            "email": "a@acme.vn",
            "phone": "+84-123",
            "position": "Director"
        },
        "organization": {
            "name": "Acme Travel",
            "headOfficeAddress": "1 Le Loi, HCMC",
            "taxCode": "0301234567",
            "legalRepresentative": "Tran Thi B"
        },
        "selection": {
            "selected": {"north": true},
            "earlyBird": true,
            "participantCount": 2
        }
    })
}

pub struct TestApp {
    pub dir: TempDir,
    pub state: web::Data<AppState<StaticTourRepository>>,
}

impl TestApp {
    /// Contract and invoice templates written to a temp dir.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("contract.docx"), contract_template()).unwrap();
        std::fs::write(dir.path().join("invoice.docx"), invoice_template()).unwrap();
        Self::with_dir(dir)
    }

    pub fn with_dir(dir: TempDir) -> Self {
        let templates = vec![
            template("contract", &dir.path().join("contract.docx"), "Contract.docx"),
            template("invoice", &dir.path().join("invoice.docx"), "Invoice.docx"),
        ];
        let engine = DocumentEngine::new(
            TemplateSource::new(None).unwrap(),
            SubstitutionOptions::default(),
        );
        let repository = StaticTourRepository::from_json(CATALOG).unwrap();
        let state = web::Data::new(AppState::new(repository, engine, templates));
        Self { dir, state }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .configure(routes::configure::<StaticTourRepository>)
    }
}

pub fn template(key: &str, path: &Path, file_name: &str) -> TemplateSpec {
    TemplateSpec {
        key: key.to_string(),
        location: TemplateLocation::Local(path.to_path_buf()),
        file_name: file_name.to_string(),
    }
}
