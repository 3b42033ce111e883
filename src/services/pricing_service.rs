use crate::models::{
    selection::{Quote, SelectionState},
    tour::{CustomizeOption, RateCard},
};

/// Surcharge applied for every participant beyond the first.
pub const EXTRA_PARTICIPANT_RATE: f64 = 0.25;

pub struct PricingService;

impl PricingService {
    /// Pick the matrix cell matching the promotion flags
    pub fn cell_for(option: &CustomizeOption, early_bird: bool, returning_client: bool) -> f64 {
        let tier = if early_bird {
            &option.price.early_bird
        } else {
            &option.price.standard
        };
        let cell = if returning_client {
            tier.returning
        } else {
            tier.regular
        };
        cell.unwrap_or(0.0)
    }

    /// Whether the selection resolves to the bundle price rather than a sum.
    /// Both the empty and the full selection do.
    pub fn uses_bundle(rate_card: &RateCard, selection: &SelectionState) -> bool {
        let mut segments = 0;
        let mut selected = 0;
        for option in rate_card.segments() {
            segments += 1;
            if selection.is_selected(&option.key) {
                selected += 1;
            }
        }
        selected == 0 || selected == segments
    }

    /// Calculate the base price for one participant
    pub fn base_price(rate_card: &RateCard, selection: &SelectionState) -> f64 {
        let (early_bird, returning) = (selection.early_bird, selection.returning_client);

        if Self::uses_bundle(rate_card, selection) {
            return rate_card
                .grand_total()
                .map(|bundle| Self::cell_for(bundle, early_bird, returning))
                .unwrap_or(0.0);
        }

        rate_card
            .segments()
            .filter(|option| selection.is_selected(&option.key))
            .map(|option| Self::cell_for(option, early_bird, returning))
            .sum()
    }

    /// Calculate total price (base plus 25% per extra participant)
    pub fn total_price(base_price: f64, participant_count: u8) -> f64 {
        let extra = f64::from(participant_count.saturating_sub(1));
        base_price + base_price * EXTRA_PARTICIPANT_RATE * extra
    }

    pub fn quote(rate_card: &RateCard, selection: &SelectionState) -> Quote {
        let base_price = Self::base_price(rate_card, selection);
        Quote {
            base_price,
            total_price: Self::total_price(base_price, selection.participant_count),
            participant_count: selection.participant_count,
            bundle: Self::uses_bundle(rate_card, selection),
        }
    }
}

/// Render a price for documents: thousands separators, at most two decimals.
pub fn format_price(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let negative = cents < 0;
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if fraction == 0 {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{:02}", sign, grouped, fraction)
    }
}
