// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub city: String,
    pub state: String,
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub location_id: i64,
    pub address: String,
    pub price: f64,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub square_feet: Option<u32>,
    pub property_type: Option<String>,
    pub listing_source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketDataType {
    RentalRate,
    PropertyValue,
}

impl MarketDataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketDataType::RentalRate => "rental_rate",
            MarketDataType::PropertyValue => "property_value",
        }
    }
}

/// One observation in a location's rental-rate or property-value history.
/// Immutable once fetched; `month` is absent for annual-granularity sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDataPoint {
    pub location_id: i64,
    pub data_type: MarketDataType,
    pub value: f64,
    pub year: i32,
    pub month: Option<u32>,
    pub source: String,
}

impl MarketDataPoint {
    /// Chronological ordering key. Points without a month sort before any
    /// point of the same year that has one.
    pub fn ordering_key(&self) -> i64 {
        self.year as i64 * 12 + self.month.unwrap_or(0) as i64
    }
}

/// Loan terms plus monthly income and expenses for one property.
/// `interest_rate` is an annual percentage (4.5 means 4.5%).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowInput {
    pub price: f64,
    pub down_payment: f64,
    pub interest_rate: f64,
    pub loan_term: u32,
    pub rent: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowResult {
    pub monthly_payment: f64,
    pub monthly_cash_flow: f64,
    pub annual_cash_flow: f64,
    pub cash_on_cash_return: f64,
}

/// Percent change per series, paired so rental and value trends travel
/// together on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendChange {
    pub rental_rate_change: f64,
    pub property_value_change: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMetrics {
    pub average_rental_rate: f64,
    pub average_property_value: f64,
    pub cap_rate: f64,
    pub price_to_rent_ratio: f64,
    pub rental_yield: f64,
    pub monthly_trend: TrendChange,
    pub annual_trend: TrendChange,
}

/// Full analysis for one location. Series are ordered newest-first, the same
/// ordering the trend calculations use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    pub location_id: i64,
    pub city: String,
    pub state: String,
    pub metrics: MarketMetrics,
    pub rental_rates: Vec<MarketDataPoint>,
    pub property_values: Vec<MarketDataPoint>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    CashFlow,
    Roi,
    CapRate,
}

/// Persisted record of a completed analysis. Write-only from the engine's
/// perspective; it is never read back into a calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub property_id: i64,
    pub analysis_type: AnalysisType,
    pub input: serde_json::Value,
    pub results: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
