use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::models::{
    selection::{Quote, SelectionState},
    tour::Tour,
};
use crate::services::document::fields::{self, ReplacementMap};
use crate::services::pricing_service::{format_price, PricingService};

/// Step 1 of the wizard: who is registering.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactPerson {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub position: String,
}

/// Step 2: the organization signing the contract.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub name: String,
    #[serde(default)]
    pub head_office_address: String,
    #[serde(default)]
    pub tax_code: String,
    #[serde(default)]
    pub legal_representative: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSubmission {
    pub tour_id: String,
    pub contact: ContactPerson,
    pub organization: Organization,
    /// Step 3: segments, promotions and head count.
    #[serde(default)]
    pub selection: SelectionState,
    #[serde(default)]
    pub notes: Option<String>,
}

fn email_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static pattern"))
}

impl RegistrationSubmission {
    /// Collect every problem with the form so the UI can show them at once.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();
        let required = [
            ("tourId", &self.tour_id),
            ("contact.fullName", &self.contact.full_name),
            ("contact.email", &self.contact.email),
            ("contact.phone", &self.contact.phone),
            ("organization.name", &self.organization.name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                problems.push(format!("{} is required", field));
            }
        }
        let email = self.contact.email.trim();
        if !email.is_empty() && !email_regex().is_match(email) {
            problems.push("contact.email is not a valid e-mail address".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    /// Text describing what was booked: the selected segments, or the
    /// bundle when the bundle price applies.
    pub fn package_selection(&self, tour: &Tour) -> String {
        let card = &tour.customize_options;
        if PricingService::uses_bundle(card, &self.selection) {
            return card
                .grand_total()
                .map(|bundle| bundle.name.clone())
                .unwrap_or_else(|| tour.name.clone());
        }
        card.segments()
            .filter(|option| self.selection.is_selected(&option.key))
            .map(|option| option.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn replacement_map(&self, tour: &Tour, quote: &Quote, date: NaiveDate) -> ReplacementMap {
        let mut map = ReplacementMap::new();
        let mut put = |field: &str, value: &str| map.insert(field, value.trim());

        put(fields::FULL_NAME, &self.contact.full_name);
        put(fields::PHONE, &self.contact.phone);
        put(fields::EMAIL, &self.contact.email);
        put(fields::POSITION, &self.contact.position);
        put(fields::ORGANIZATION_NAME, &self.organization.name);
        put(fields::HEAD_OFFICE_ADDRESS, &self.organization.head_office_address);
        put(fields::TAX_CODE, &self.organization.tax_code);
        put(fields::LEGAL_REPRESENTATIVE, &self.organization.legal_representative);
        put(fields::TOUR_NAME, &tour.name);
        put(fields::PACKAGE_SELECTION, &self.package_selection(tour));
        put(fields::PARTICIPANTS, &quote.participant_count.to_string());
        put(fields::BASE_PRICE, &format_price(quote.base_price));
        put(fields::TOTAL_PRICE, &format_price(quote.total_price));
        put(fields::DATE, &date.format("%d/%m/%Y").to_string());
        put(fields::NOTES, self.notes.as_deref().unwrap_or_default());

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tour::{CustomizeOption, PriceMatrix, PriceTier, RateCard};

    fn tour() -> Tour {
        let option = |key: &str, name: &str, regular: f64| CustomizeOption {
            key: key.to_string(),
            name: name.to_string(),
            description: None,
            price: PriceMatrix {
                early_bird: PriceTier {
                    regular: Some(regular),
                    returning: None,
                },
                standard: PriceTier::default(),
            },
        };
        Tour {
            id: "mekong".to_string(),
            name: "Mekong Study Tour".to_string(),
            customize_options: RateCard::new(vec![
                option("north", "Northern leg", 500.0),
                option("south", "Southern leg", 400.0),
                option("grandTotal", "Full programme", 800.0),
            ]),
        }
    }

    fn submission() -> RegistrationSubmission {
        RegistrationSubmission {
            tour_id: "mekong".to_string(),
            contact: ContactPerson {
                full_name: "Nguyen Van A".to_string(),
                email: "a@acme.vn".to_string(),
                phone: " +84-123 ".to_string(),
                position: "Director".to_string(),
            },
            organization: Organization {
                name: "Acme".to_string(),
                ..Default::default()
            },
            selection: SelectionState {
                early_bird: true,
                participant_count: 2,
                ..Default::default()
            },
            notes: None,
        }
    }

    #[test]
    fn test_validate_collects_problems() {
        assert!(submission().validate().is_ok());

        let mut bad = submission();
        bad.contact.email = "not-an-email".to_string();
        bad.organization.name = "  ".to_string();
        let problems = bad.validate().unwrap_err();
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().any(|p| p.contains("organization.name")));
    }

    #[test]
    fn test_package_selection_text() {
        let tour = tour();
        let mut form = submission();
        assert_eq!(form.package_selection(&tour), "Full programme");

        form.selection.selected.insert("south".to_string(), true);
        assert_eq!(form.package_selection(&tour), "Southern leg");

        form.selection.selected.insert("north".to_string(), true);
        assert_eq!(form.package_selection(&tour), "Full programme");
    }

    #[test]
    fn test_replacement_map_fields() {
        let tour = tour();
        let mut form = submission();
        form.selection.selected.insert("north".to_string(), true);
        let quote = PricingService::quote(&tour.customize_options, &form.selection);
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();

        let map = form.replacement_map(&tour, &quote, date);
        assert_eq!(map.get(fields::PHONE), Some("+84-123"));
        assert_eq!(map.get(fields::PACKAGE_SELECTION), Some("Northern leg"));
        assert_eq!(map.get(fields::BASE_PRICE), Some("500"));
        assert_eq!(map.get(fields::TOTAL_PRICE), Some("625"));
        assert_eq!(map.get(fields::PARTICIPANTS), Some("2"));
        assert_eq!(map.get(fields::DATE), Some("09/03/2026"));
        assert_eq!(map.get(fields::NOTES), Some(""));
    }
}
