// src/services/market.rs
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};

use crate::models::{
    Location, MarketAnalysis, MarketDataPoint, MarketDataType, MarketMetrics, TrendChange,
};

/// Source of location metadata and market-data history. Injected so the
/// analyzer can be exercised against arbitrary series in tests instead of a
/// fixed dataset.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn get_location(&self, id: i64) -> Result<Option<Location>>;

    async fn get_market_data(
        &self,
        location_id: i64,
        data_type: MarketDataType,
    ) -> Result<Vec<MarketDataPoint>>;
}

#[derive(Debug)]
pub enum AnalysisError {
    LocationNotFound(i64),
    EmptySeries(MarketDataType),
    Source(anyhow::Error),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalysisError::LocationNotFound(id) => write!(f, "Location {} not found", id),
            AnalysisError::EmptySeries(data_type) => {
                write!(f, "No {} data available", data_type.as_str())
            }
            AnalysisError::Source(e) => write!(f, "Market data source error: {}", e),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<anyhow::Error> for AnalysisError {
    fn from(e: anyhow::Error) -> Self {
        AnalysisError::Source(e)
    }
}

pub struct MarketAnalyzer {
    source: Arc<dyn MarketDataSource>,
}

impl MarketAnalyzer {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    /// Recomputes all metrics from the full history on every call; nothing is
    /// cached between invocations.
    pub async fn analyze_location(&self, location_id: i64) -> Result<MarketAnalysis, AnalysisError> {
        let location = self
            .source
            .get_location(location_id)
            .await?
            .ok_or(AnalysisError::LocationNotFound(location_id))?;

        let mut rental_rates = self
            .source
            .get_market_data(location_id, MarketDataType::RentalRate)
            .await?;
        let mut property_values = self
            .source
            .get_market_data(location_id, MarketDataType::PropertyValue)
            .await?;

        sort_newest_first(&mut rental_rates);
        sort_newest_first(&mut property_values);
        debug!(
            "Analyzing location {}: {} rental points, {} value points",
            location_id,
            rental_rates.len(),
            property_values.len()
        );

        let metrics = calculate_metrics(&rental_rates, &property_values)?;

        Ok(MarketAnalysis {
            location_id,
            city: location.city,
            state: location.state,
            metrics,
            rental_rates,
            property_values,
            last_updated: Utc::now(),
        })
    }
}

/// Stable sort, so points sharing an ordering key keep their source order.
fn sort_newest_first(series: &mut [MarketDataPoint]) {
    series.sort_by_key(|p| std::cmp::Reverse(p.ordering_key()));
}

fn average(series: &[MarketDataPoint], data_type: MarketDataType) -> Result<f64, AnalysisError> {
    if series.is_empty() {
        // Averaging zero points would be NaN; refuse instead.
        return Err(AnalysisError::EmptySeries(data_type));
    }
    Ok(series.iter().map(|p| p.value).sum::<f64>() / series.len() as f64)
}

fn percent_change(current: f64, previous: f64) -> f64 {
    (current - previous) / previous * 100.0
}

/// Month-over-month change: the two newest points. 0 for a series too short
/// to compare.
fn monthly_change(series: &[MarketDataPoint]) -> f64 {
    match series {
        [newest, previous, ..] => percent_change(newest.value, previous.value),
        _ => 0.0,
    }
}

/// Change across the whole series: newest vs. oldest point. 0 for a series
/// too short to compare.
fn full_period_change(series: &[MarketDataPoint]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    percent_change(series[0].value, series[series.len() - 1].value)
}

/// Both series must already be sorted newest-first.
fn calculate_metrics(
    rental_rates: &[MarketDataPoint],
    property_values: &[MarketDataPoint],
) -> Result<MarketMetrics, AnalysisError> {
    let average_rental_rate = average(rental_rates, MarketDataType::RentalRate)?;
    let average_property_value = average(property_values, MarketDataType::PropertyValue)?;

    if rental_rates.len() < 2 || property_values.len() < 2 {
        warn!("Series too short for trend calculation, reporting flat trends");
    }

    let monthly_trend = TrendChange {
        rental_rate_change: monthly_change(rental_rates),
        property_value_change: monthly_change(property_values),
    };
    let annual_trend = TrendChange {
        rental_rate_change: full_period_change(rental_rates),
        property_value_change: full_period_change(property_values),
    };

    let annual_rental_income = average_rental_rate * 12.0;
    let cap_rate = annual_rental_income / average_property_value * 100.0;
    let price_to_rent_ratio = average_property_value / annual_rental_income;
    // Same formula as cap rate in this simplified model, reported separately.
    let rental_yield = annual_rental_income / average_property_value * 100.0;

    Ok(MarketMetrics {
        average_rental_rate,
        average_property_value,
        cap_rate,
        price_to_rent_ratio,
        rental_yield,
        monthly_trend,
        annual_trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryStore;

    fn point(value: f64, year: i32, month: Option<u32>, data_type: MarketDataType) -> MarketDataPoint {
        MarketDataPoint {
            location_id: 1,
            data_type,
            value,
            year,
            month,
            source: "test".into(),
        }
    }

    fn series(values: &[f64], data_type: MarketDataType) -> Vec<MarketDataPoint> {
        // Oldest first on input; the analyzer sorts newest-first itself.
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| point(v, 2024, Some(i as u32 + 1), data_type))
            .collect()
    }

    fn analyzer() -> MarketAnalyzer {
        MarketAnalyzer::new(Arc::new(MemoryStore::seeded()))
    }

    #[tokio::test]
    async fn analyzes_seeded_san_francisco_data() {
        let analysis = analyzer().analyze_location(1).await.unwrap();

        assert_eq!(analysis.location_id, 1);
        assert_eq!(analysis.city, "San Francisco");
        assert_eq!(analysis.state, "CA");
        assert_eq!(analysis.rental_rates.len(), 6);
        assert_eq!(analysis.property_values.len(), 6);

        let m = &analysis.metrics;
        assert!((m.average_rental_rate - 3375.0).abs() < 0.5);
        assert!((m.average_property_value - 1_150_000.0).abs() < 0.5);
        // (3375 * 12) / 1150000 * 100
        assert!((m.cap_rate - 3.52).abs() < 0.01);
        // 1150000 / (3375 * 12)
        assert!((m.price_to_rent_ratio - 28.4).abs() < 0.05);

        // (3500 - 3450) / 3450 * 100
        assert!((m.monthly_trend.rental_rate_change - 1.45).abs() < 0.01);
        // (1200000 - 1180000) / 1180000 * 100
        assert!((m.monthly_trend.property_value_change - 1.69).abs() < 0.01);
        // (3500 - 3250) / 3250 * 100
        assert!((m.annual_trend.rental_rate_change - 7.69).abs() < 0.01);
        // (1200000 - 1100000) / 1100000 * 100
        assert!((m.annual_trend.property_value_change - 9.09).abs() < 0.01);
    }

    #[tokio::test]
    async fn cap_rate_equals_rental_yield() {
        for id in [1, 2] {
            let analysis = analyzer().analyze_location(id).await.unwrap();
            assert_eq!(analysis.metrics.cap_rate, analysis.metrics.rental_yield);
        }
    }

    #[tokio::test]
    async fn series_come_back_newest_first() {
        let analysis = analyzer().analyze_location(1).await.unwrap();
        let keys: Vec<i64> = analysis.rental_rates.iter().map(|p| p.ordering_key()).collect();
        let mut sorted = keys.clone();
        sorted.sort_by_key(|k| std::cmp::Reverse(*k));
        assert_eq!(keys, sorted);
    }

    #[tokio::test]
    async fn unknown_location_is_not_found() {
        let err = analyzer().analyze_location(999).await.unwrap_err();
        assert!(matches!(err, AnalysisError::LocationNotFound(999)));
    }

    #[tokio::test]
    async fn location_without_data_is_empty_series() {
        let store = MemoryStore::new();
        store
            .insert_location(Location {
                id: 7,
                city: "Fresno".into(),
                state: "CA".into(),
                zip_code: None,
            })
            .await;
        let analyzer = MarketAnalyzer::new(Arc::new(store));
        let err = analyzer.analyze_location(7).await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptySeries(MarketDataType::RentalRate)));
    }

    #[test]
    fn single_point_series_has_flat_trends() {
        let rents = series(&[3000.0], MarketDataType::RentalRate);
        let values = series(&[900_000.0], MarketDataType::PropertyValue);
        let metrics = calculate_metrics(&rents, &values).unwrap();
        assert_eq!(metrics.monthly_trend.rental_rate_change, 0.0);
        assert_eq!(metrics.monthly_trend.property_value_change, 0.0);
        assert_eq!(metrics.annual_trend.rental_rate_change, 0.0);
        assert_eq!(metrics.annual_trend.property_value_change, 0.0);
        assert!(metrics.cap_rate.is_finite());
    }

    #[test]
    fn two_point_series_has_equal_monthly_and_annual_trend() {
        let mut rents = series(&[3000.0, 3100.0], MarketDataType::RentalRate);
        let mut values = series(&[900_000.0, 910_000.0], MarketDataType::PropertyValue);
        sort_newest_first(&mut rents);
        sort_newest_first(&mut values);
        let metrics = calculate_metrics(&rents, &values).unwrap();
        assert_eq!(
            metrics.monthly_trend.rental_rate_change,
            metrics.annual_trend.rental_rate_change
        );
    }

    #[test]
    fn empty_series_is_an_error_not_nan() {
        let rents: Vec<MarketDataPoint> = vec![];
        let values = series(&[900_000.0], MarketDataType::PropertyValue);
        let err = calculate_metrics(&rents, &values).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptySeries(MarketDataType::RentalRate)));
    }

    #[test]
    fn sort_handles_missing_month_and_ties() {
        let mut points = vec![
            point(1.0, 2024, Some(3), MarketDataType::RentalRate),
            point(2.0, 2024, None, MarketDataType::RentalRate),
            point(3.0, 2024, Some(3), MarketDataType::RentalRate),
            point(4.0, 2025, Some(1), MarketDataType::RentalRate),
        ];
        sort_newest_first(&mut points);
        assert_eq!(points[0].value, 4.0);
        // Stable: equal keys keep input order.
        assert_eq!(points[1].value, 1.0);
        assert_eq!(points[2].value, 3.0);
        // Missing month sorts oldest within the year.
        assert_eq!(points[3].value, 2.0);
    }
}
