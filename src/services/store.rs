// src/services/store.rs
use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{AnalysisRecord, Location, MarketDataPoint, MarketDataType, Property};
use crate::services::market::MarketDataSource;

#[async_trait]
pub trait PropertySource: Send + Sync {
    async fn get_property(&self, id: i64) -> Result<Option<Property>>;
}

/// Write-only sink for finished analyses; the engine never reads them back.
#[async_trait]
pub trait AnalysisSink: Send + Sync {
    async fn save_analysis(&self, record: AnalysisRecord) -> Result<()>;
}

/// In-process data store backing all accessor traits. Persistence proper is
/// out of scope for this service, so the store keeps everything behind
/// `RwLock`s and can be seeded with a demo dataset at startup.
#[derive(Default)]
pub struct MemoryStore {
    locations: RwLock<HashMap<i64, Location>>,
    properties: RwLock<HashMap<i64, Property>>,
    market_data: RwLock<Vec<MarketDataPoint>>,
    analyses: RwLock<Vec<AnalysisRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_location(&self, location: Location) {
        self.locations.write().await.insert(location.id, location);
    }

    pub async fn insert_property(&self, property: Property) {
        self.properties.write().await.insert(property.id, property);
    }

    pub async fn insert_market_data(&self, points: Vec<MarketDataPoint>) {
        self.market_data.write().await.extend(points);
    }

    pub async fn saved_analyses(&self) -> Vec<AnalysisRecord> {
        self.analyses.read().await.clone()
    }

    /// Two Bay Area markets with six months of history each, plus a listing
    /// in each, enough to exercise every endpoint out of the box.
    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut locations = store.locations.try_write().expect("fresh store");
            locations.insert(
                1,
                Location {
                    id: 1,
                    city: "San Francisco".into(),
                    state: "CA".into(),
                    zip_code: Some("94110".into()),
                },
            );
            locations.insert(
                2,
                Location {
                    id: 2,
                    city: "Oakland".into(),
                    state: "CA".into(),
                    zip_code: Some("94612".into()),
                },
            );
        }
        {
            let mut properties = store.properties.try_write().expect("fresh store");
            properties.insert(
                1,
                Property {
                    id: 1,
                    location_id: 2,
                    address: "2847 Telegraph Ave, Oakland, CA 94612".into(),
                    price: 500_000.0,
                    bedrooms: Some(2),
                    bathrooms: Some(1.0),
                    square_feet: Some(1050),
                    property_type: Some("condo".into()),
                    listing_source: "seed".into(),
                },
            );
            properties.insert(
                2,
                Property {
                    id: 2,
                    location_id: 1,
                    address: "742 Noe St, San Francisco, CA 94110".into(),
                    price: 1_150_000.0,
                    bedrooms: Some(3),
                    bathrooms: Some(2.0),
                    square_feet: Some(1680),
                    property_type: Some("single_family".into()),
                    listing_source: "seed".into(),
                },
            );
        }
        {
            let mut market_data = store.market_data.try_write().expect("fresh store");
            market_data.extend(monthly_series(1, MarketDataType::RentalRate, 3250.0, 50.0));
            market_data.extend(monthly_series(1, MarketDataType::PropertyValue, 1_100_000.0, 20_000.0));
            market_data.extend(monthly_series(2, MarketDataType::RentalRate, 2550.0, 50.0));
            market_data.extend(monthly_series(2, MarketDataType::PropertyValue, 750_000.0, 20_000.0));
        }
        store
    }
}

/// Six monthly points, January through June 2024, rising by `step` each month.
fn monthly_series(
    location_id: i64,
    data_type: MarketDataType,
    start: f64,
    step: f64,
) -> Vec<MarketDataPoint> {
    (0..6)
        .map(|i| MarketDataPoint {
            location_id,
            data_type,
            value: start + step * i as f64,
            year: 2024,
            month: Some(i + 1),
            source: "seed".into(),
        })
        .collect()
}

#[async_trait]
impl MarketDataSource for MemoryStore {
    async fn get_location(&self, id: i64) -> Result<Option<Location>> {
        Ok(self.locations.read().await.get(&id).cloned())
    }

    async fn get_market_data(
        &self,
        location_id: i64,
        data_type: MarketDataType,
    ) -> Result<Vec<MarketDataPoint>> {
        Ok(self
            .market_data
            .read()
            .await
            .iter()
            .filter(|p| p.location_id == location_id && p.data_type == data_type)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PropertySource for MemoryStore {
    async fn get_property(&self, id: i64) -> Result<Option<Property>> {
        Ok(self.properties.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl AnalysisSink for MemoryStore {
    async fn save_analysis(&self, record: AnalysisRecord) -> Result<()> {
        self.analyses.write().await.push(record);
        Ok(())
    }
}
