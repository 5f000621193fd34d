// src/handlers/analysis.rs
use std::sync::Arc;

use chrono::Utc;
use log::{error, info, warn};
use serde::Deserialize;
use warp::reply::Json;
use warp::Rejection;

use crate::handlers::error::ApiError;
use crate::models::{AnalysisRecord, AnalysisType, CashFlowInput};
use crate::services::cash_flow;
use crate::services::store::{AnalysisSink, MemoryStore, PropertySource};

/// Loan and operating terms supplied by the client; the purchase price comes
/// from the property record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowParams {
    pub down_payment: f64,
    pub interest_rate: f64,
    pub loan_term: u32,
    pub rent: f64,
    pub expenses: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowRequest {
    pub property_id: i64,
    pub analysis_params: CashFlowParams,
}

fn validate_params(params: &CashFlowParams) -> Result<(), ApiError> {
    if params.down_payment < 0.0 {
        return Err(ApiError::validation("Down payment must be a non-negative number"));
    }
    if !(0.0..=100.0).contains(&params.interest_rate) {
        return Err(ApiError::validation("Interest rate must be between 0 and 100"));
    }
    if !(1..=50).contains(&params.loan_term) {
        return Err(ApiError::validation("Loan term must be between 1 and 50 years"));
    }
    if params.rent < 0.0 {
        return Err(ApiError::validation("Rent must be a non-negative number"));
    }
    if params.expenses < 0.0 {
        return Err(ApiError::validation("Expenses must be a non-negative number"));
    }
    Ok(())
}

pub async fn calculate_cash_flow(
    request: CashFlowRequest,
    store: Arc<MemoryStore>,
) -> Result<Json, Rejection> {
    info!("Handling cash flow analysis for property {}", request.property_id);

    validate_params(&request.analysis_params).map_err(warp::reject::custom)?;

    let property = store
        .get_property(request.property_id)
        .await
        .map_err(|e| {
            error!("Property lookup failed: {}", e);
            warp::reject::custom(ApiError::internal(e.to_string()))
        })?
        .ok_or_else(|| warp::reject::custom(ApiError::property_not_found(request.property_id)))?;

    let params = &request.analysis_params;
    if params.down_payment > property.price {
        warn!(
            "Down payment {} exceeds price {} for property {}",
            params.down_payment, property.price, property.id
        );
    }

    let input = CashFlowInput {
        price: property.price,
        down_payment: params.down_payment,
        interest_rate: params.interest_rate,
        loan_term: params.loan_term,
        rent: params.rent,
        expenses: params.expenses,
    };
    let result = cash_flow::calculate(&input);

    let record = AnalysisRecord {
        property_id: property.id,
        analysis_type: AnalysisType::CashFlow,
        input: serde_json::to_value(&input)
            .map_err(|e| warp::reject::custom(ApiError::internal(e.to_string())))?,
        results: serde_json::to_value(&result)
            .map_err(|e| warp::reject::custom(ApiError::internal(e.to_string())))?,
        created_at: Utc::now(),
    };
    if let Err(e) = store.save_analysis(record).await {
        // The computation already succeeded, so return it; the sink is
        // best-effort from this handler's perspective.
        error!("Failed to persist analysis result: {}", e);
    }

    Ok(warp::reply::json(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::error::ErrorCode;

    fn params() -> CashFlowParams {
        CashFlowParams {
            down_payment: 100_000.0,
            interest_rate: 4.5,
            loan_term: 30,
            rent: 2500.0,
            expenses: 500.0,
        }
    }

    #[test]
    fn accepts_reasonable_params() {
        assert!(validate_params(&params()).is_ok());
    }

    #[test]
    fn accepts_zero_interest() {
        let mut p = params();
        p.interest_rate = 0.0;
        assert!(validate_params(&p).is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases: Vec<Box<dyn Fn(&mut CashFlowParams)>> = vec![
            Box::new(|p| p.down_payment = -1.0),
            Box::new(|p| p.interest_rate = -0.5),
            Box::new(|p| p.interest_rate = 101.0),
            Box::new(|p| p.loan_term = 0),
            Box::new(|p| p.loan_term = 51),
            Box::new(|p| p.rent = -100.0),
            Box::new(|p| p.expenses = -1.0),
        ];
        for mutate in cases {
            let mut p = params();
            mutate(&mut p);
            let err = validate_params(&p).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError);
        }
    }
}
