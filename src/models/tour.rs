use serde::{Deserialize, Serialize};

/// Key of the option that carries the "all segments" bundle price.
pub const GRAND_TOTAL_KEY: &str = "grandTotal";

/// One column of the pricing matrix. Cells missing from the catalog
/// contribute nothing to a quote.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PriceTier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returning: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceMatrix {
    #[serde(default)]
    pub early_bird: PriceTier,
    #[serde(default)]
    pub standard: PriceTier,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CustomizeOption {
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub price: PriceMatrix,
}

impl CustomizeOption {
    pub fn is_grand_total(&self) -> bool {
        self.key == GRAND_TOTAL_KEY
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct RateCard {
    pub options: Vec<CustomizeOption>,
}

impl RateCard {
    pub fn new(options: Vec<CustomizeOption>) -> Self {
        Self { options }
    }

    /// Individually selectable segments, i.e. everything except the bundle.
    pub fn segments(&self) -> impl Iterator<Item = &CustomizeOption> {
        self.options.iter().filter(|option| !option.is_grand_total())
    }

    pub fn grand_total(&self) -> Option<&CustomizeOption> {
        self.options.iter().find(|option| option.is_grand_total())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(alias = "tour_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub customize_options: RateCard,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TourSummary {
    pub id: String,
    pub name: String,
    pub segments: usize,
}

impl From<&Tour> for TourSummary {
    fn from(tour: &Tour) -> Self {
        Self {
            id: tour.id.clone(),
            name: tour.name.clone(),
            segments: tour.customize_options.segments().count(),
        }
    }
}
