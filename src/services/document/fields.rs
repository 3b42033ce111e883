use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FULL_NAME: &str = "FULL_NAME";
pub const PHONE: &str = "PHONE";
pub const EMAIL: &str = "EMAIL";
pub const POSITION: &str = "POSITION";
pub const ORGANIZATION_NAME: &str = "ORGANIZATION_NAME";
pub const HEAD_OFFICE_ADDRESS: &str = "HEAD_OFFICE_ADDRESS";
pub const TAX_CODE: &str = "TAX_CODE";
pub const LEGAL_REPRESENTATIVE: &str = "LEGAL_REPRESENTATIVE";
pub const TOUR_NAME: &str = "TOUR_NAME";
pub const PACKAGE_SELECTION: &str = "PACKAGE_SELECTION";
pub const PARTICIPANTS: &str = "PARTICIPANTS";
pub const BASE_PRICE: &str = "BASE_PRICE";
pub const TOTAL_PRICE: &str = "TOTAL_PRICE";
pub const DATE: &str = "DATE";
pub const NOTES: &str = "NOTES";

/// Fields resolved ahead of the generic loop. Templates spell these in any case.
pub const CONTACT_FIELDS: [&str; 2] = [PHONE, EMAIL];

/// Labels that name a field in the surrounding template text, English first and
/// Vietnamese where the bilingual templates use one. All lowercase.
const FIELD_LABELS: &[(&str, &[&str])] = &[
    (PHONE, &["phone", "điện thoại"]),
    (EMAIL, &["email", "e-mail"]),
    (POSITION, &["position", "chức vụ"]),
    (FULL_NAME, &["full name", "họ và tên", "họ tên"]),
    (
        ORGANIZATION_NAME,
        &["organization name", "organization", "tên tổ chức", "tên đơn vị"],
    ),
    (
        HEAD_OFFICE_ADDRESS,
        &["head office address", "head office", "trụ sở chính", "trụ sở"],
    ),
    (TAX_CODE, &["tax code", "mã số thuế"]),
    (
        LEGAL_REPRESENTATIVE,
        &["legal representative", "representative", "người đại diện"],
    ),
    (TOUR_NAME, &["tour name", "tên tour"]),
    (PACKAGE_SELECTION, &["package", "gói"]),
    (PARTICIPANTS, &["participants", "số người"]),
    (TOTAL_PRICE, &["total price", "tổng giá", "tổng cộng"]),
];

pub fn labels_for(field: &str) -> &'static [&'static str] {
    FIELD_LABELS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, labels)| *labels)
        .unwrap_or(&[])
}

/// Field name to literal value. Keys are stored upper-cased so lookups from
/// `[Phone]`, `{phone}` and `[PHONE]` all land on the same entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct ReplacementMap {
    values: BTreeMap<String, String>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl AsRef<str>, value: impl Into<String>) {
        self.values
            .insert(field.as_ref().trim().to_uppercase(), value.into());
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(&field.to_uppercase()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for ReplacementMap {
    fn from(raw: BTreeMap<String, String>) -> Self {
        let mut map = Self::new();
        for (field, value) in raw {
            map.insert(field, value);
        }
        map
    }
}

impl From<ReplacementMap> for BTreeMap<String, String> {
    fn from(map: ReplacementMap) -> Self {
        map.values
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ReplacementMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (field, value) in iter {
            map.insert(field, value);
        }
        map
    }
}
