use std::io::{Cursor, Read, Write};

use zip::{result::ZipError, write::SimpleFileOptions, ZipArchive, ZipWriter};

use super::{
    fields::ReplacementMap,
    substitution::{substitute, SubstitutionOptions},
    DocumentError,
};

/// Main document part of a WordprocessingML package.
pub const DOCUMENT_PART: &str = "word/document.xml";

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

fn malformed(err: impl std::fmt::Display) -> DocumentError {
    DocumentError::MalformedPackage(err.to_string())
}

/// Read the document body out of a `.docx` package.
pub fn read_document_part(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(malformed)?;
    let mut part = match archive.by_name(DOCUMENT_PART) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => return Err(DocumentError::MissingDocumentPart(DOCUMENT_PART)),
        Err(err) => return Err(malformed(err)),
    };
    let mut xml = String::new();
    part.read_to_string(&mut xml).map_err(malformed)?;
    Ok(xml)
}

/// Produce a new package with placeholders in the document body resolved.
///
/// Every other entry is raw-copied, keeping order, compression and bytes.
pub fn fill_package(
    bytes: &[u8],
    replacements: &ReplacementMap,
    options: &SubstitutionOptions,
) -> Result<Vec<u8>, DocumentError> {
    if replacements.is_empty() {
        return Err(DocumentError::EmptyReplacements);
    }

    let xml = read_document_part(bytes)?;
    let filled = substitute(&xml, replacements, options);

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(malformed)?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(bytes.len())));

    for index in 0..archive.len() {
        // the rewritten entry keeps the template's timestamp so output is reproducible
        let (name, entry_options) = {
            let entry = archive.by_index_raw(index).map_err(malformed)?;
            let mut options = SimpleFileOptions::default()
                .compression_method(entry.compression())
                .last_modified_time(entry.last_modified().unwrap_or_default());
            if let Some(mode) = entry.unix_mode() {
                options = options.unix_permissions(mode);
            }
            (entry.name().to_string(), options)
        };

        if name == DOCUMENT_PART {
            writer
                .start_file(name, entry_options)
                .map_err(|err| DocumentError::Assemble(err.to_string()))?;
            writer
                .write_all(filled.as_bytes())
                .map_err(|err| DocumentError::Assemble(err.to_string()))?;
        } else {
            let entry = archive.by_index_raw(index).map_err(malformed)?;
            writer
                .raw_copy_file(entry)
                .map_err(|err| DocumentError::Assemble(err.to_string()))?;
        }
    }

    let cursor = writer
        .finish()
        .map_err(|err| DocumentError::Assemble(err.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

    pub(crate) fn body(text_runs: &[&str]) -> String {
        let runs: String = text_runs
            .iter()
            .map(|text| format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, text))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p>{}</w:p></w:body></w:document>"#,
            runs
        )
    }

    pub(crate) fn docx(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in parts {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut buf = Vec::new();
                file.read_to_end(&mut buf).unwrap();
                (file.name().to_string(), buf)
            })
            .collect()
    }

    #[test]
    fn test_fill_rewrites_only_document_part() {
        let styles = "<w:styles>[PHONE] stays here</w:styles>";
        let document = body(&["Phone: [", "PHONE", "]"]);
        let template = docx(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            (DOCUMENT_PART, document.as_str()),
            ("word/styles.xml", styles),
        ]);
        let map = ReplacementMap::new().with("PHONE", "+84-123");

        let filled = fill_package(&template, &map, &SubstitutionOptions::default()).unwrap();
        let before = entries(&template);
        let after = entries(&filled);

        let names: Vec<&str> = after.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["[Content_Types].xml", DOCUMENT_PART, "word/styles.xml"]);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);

        let xml = read_document_part(&filled).unwrap();
        assert!(xml.contains(r#"<w:t xml:space="preserve">Phone: +84-123</w:t>"#));
        assert!(!xml.contains("PHONE"));
    }

    #[test]
    fn test_fill_is_byte_for_byte_reproducible() {
        let document = body(&["Phone: [PHONE]"]);
        let template = docx(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            (DOCUMENT_PART, document.as_str()),
        ]);
        let map = ReplacementMap::new().with("PHONE", "+84-123");
        let options = SubstitutionOptions::default();

        let first = fill_package(&template, &map, &options).unwrap();
        // zip timestamps have a two second resolution
        std::thread::sleep(std::time::Duration::from_millis(2100));
        let second = fill_package(&template, &map, &options).unwrap();
        assert_eq!(first, second);

        let mut before = ZipArchive::new(Cursor::new(template.as_slice())).unwrap();
        let mut after = ZipArchive::new(Cursor::new(first.as_slice())).unwrap();
        let original = before.by_name(DOCUMENT_PART).unwrap().last_modified();
        let rewritten = after.by_name(DOCUMENT_PART).unwrap().last_modified();
        assert_eq!(rewritten, original);
    }

    #[test]
    fn test_missing_document_part_is_reported() {
        let template = docx(&[("[Content_Types].xml", CONTENT_TYPES)]);
        let map = ReplacementMap::new().with("PHONE", "1");
        let err = fill_package(&template, &map, &SubstitutionOptions::default()).unwrap_err();
        assert!(matches!(err, DocumentError::MissingDocumentPart(DOCUMENT_PART)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let map = ReplacementMap::new().with("PHONE", "1");
        let err = fill_package(b"not a zip at all", &map, &SubstitutionOptions::default())
            .unwrap_err();
        assert!(matches!(err, DocumentError::MalformedPackage(_)));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_empty_map_is_rejected() {
        let document = body(&["[PHONE]"]);
        let template = docx(&[(DOCUMENT_PART, document.as_str())]);
        let err = fill_package(&template, &ReplacementMap::new(), &SubstitutionOptions::default())
            .unwrap_err();
        assert!(matches!(err, DocumentError::EmptyReplacements));
    }

    #[test]
    fn test_plain_template_keeps_its_text() {
        let xml = body(&["Welcome aboard, ", "see you in Hoi An."]);
        let template = docx(&[(DOCUMENT_PART, xml.as_str())]);
        let map = ReplacementMap::new().with("EMAIL", "a@b.vn");
        let filled = fill_package(&template, &map, &SubstitutionOptions::default()).unwrap();
        assert_eq!(read_document_part(&filled).unwrap(), xml);
    }
}
