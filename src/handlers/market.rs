// src/handlers/market.rs
use std::sync::Arc;

use log::{error, info};
use warp::reply::Json;
use warp::Rejection;

use crate::handlers::error::ApiError;
use crate::services::market::MarketAnalyzer;

pub async fn get_market_analysis(
    location_id: i64,
    analyzer: Arc<MarketAnalyzer>,
) -> Result<Json, Rejection> {
    info!("Handling market analysis request for location {}", location_id);

    match analyzer.analyze_location(location_id).await {
        Ok(analysis) => Ok(warp::reply::json(&analysis)),
        Err(e) => {
            error!("Market analysis failed for location {}: {}", location_id, e);
            Err(warp::reject::custom(ApiError::from(e)))
        }
    }
}
