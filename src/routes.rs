// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;

use log::info;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::analysis::calculate_cash_flow;
use crate::handlers::error::{ApiError, ErrorCode};
use crate::handlers::market::get_market_analysis;
use crate::services::market::MarketAnalyzer;
use crate::services::store::MemoryStore;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, status, message) = if err.is_not_found() {
        (ErrorCode::NotFound, StatusCode::NOT_FOUND, "Resource not found".to_string())
    } else if let Some(api_error) = err.find::<ApiError>() {
        (api_error.code, api_error.status(), api_error.message.clone())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (ErrorCode::ValidationError, StatusCode::BAD_REQUEST, e.to_string())
    } else {
        (ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": {
                "code": code,
                "message": message,
            }
        })),
        status,
    ))
}

pub fn routes(store: Arc<MemoryStore>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let analyzer = Arc::new(MarketAnalyzer::new(store.clone()));
    let analyzer_filter = warp::any().map(move || analyzer.clone());
    let store_filter = warp::any().map(move || store.clone());

    let market_route = warp::path!("api" / "v1" / "market" / i64)
        .and(warp::get())
        .and(analyzer_filter)
        .and_then(get_market_analysis);

    let cash_flow_route = warp::path!("api" / "v1" / "analysis" / "cash-flow")
        .and(warp::post())
        .and(warp::body::json())
        .and(store_filter)
        .and_then(calculate_cash_flow);

    info!("All routes configured successfully.");

    market_route.or(cash_flow_route).recover(handle_rejection)
}
