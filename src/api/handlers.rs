//! HTTP request handlers for the calculation API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    calculate_avos, calculate_employer_cost, calculate_fgts_for, calculate_inss, calculate_irrf,
    EmployerCostParams, IrrfResult,
};
use crate::config::RuleTableProvider;
use crate::error::EngineResult;

use super::request::{AvosRequest, EmployerCostRequest, FgtsRequest, InssRequest, IrrfRequest};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/inss", post(inss_handler))
        .route("/irrf", post(irrf_handler))
        .route("/fgts", post(fgts_handler))
        .route("/avos", post(avos_handler))
        .route("/employer-cost", post(employer_cost_handler))
        .with_state(state)
}

/// Handler for POST /inss.
async fn inss_handler(
    State(state): State<AppState>,
    payload: Result<Json<InssRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match accept(correlation_id, "inss", payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = calculate_inss(
        request.gross_salary,
        request.pro_labore,
        request.year,
        state.tables(),
    );
    respond(correlation_id, "inss", start_time, result)
}

/// Handler for POST /irrf.
///
/// When the request omits `inss_amount` in normal mode, the employee INSS
/// for the same year is computed first and deducted.
async fn irrf_handler(
    State(state): State<AppState>,
    payload: Result<Json<IrrfRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match accept(correlation_id, "irrf", payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = perform_irrf(&request, state.tables());
    respond(correlation_id, "irrf", start_time, result)
}

fn perform_irrf(request: &IrrfRequest, tables: &RuleTableProvider) -> EngineResult<IrrfResult> {
    let inss_amount = match request.inss_amount {
        Some(amount) => amount,
        None if request.simplified_deduction => Decimal::ZERO,
        None => calculate_inss(request.gross_salary, false, request.year, tables)?.amount,
    };
    calculate_irrf(
        &request.to_input(inss_amount),
        request.year,
        request.month,
        tables,
    )
}

/// Handler for POST /fgts.
async fn fgts_handler(payload: Result<Json<FgtsRequest>, JsonRejection>) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match accept(correlation_id, "fgts", payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = calculate_fgts_for(request.gross_salary, &request.registration_type);
    respond(correlation_id, "fgts", start_time, result)
}

/// Handler for POST /avos.
async fn avos_handler(payload: Result<Json<AvosRequest>, JsonRejection>) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match accept(correlation_id, "avos", payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = calculate_avos(
        request.admission_date,
        request.reference_date,
        &request.leave_periods,
    );
    respond(correlation_id, "avos", start_time, result)
}

/// Handler for POST /employer-cost.
async fn employer_cost_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmployerCostRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match accept(correlation_id, "employer_cost", payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = to_cost_params(&request)
        .and_then(|params| calculate_employer_cost(&params, state.tables()));
    respond(correlation_id, "employer_cost", start_time, result)
}

fn to_cost_params(request: &EmployerCostRequest) -> EngineResult<EmployerCostParams> {
    Ok(EmployerCostParams {
        gross_salary: request.gross_salary,
        registration_type: request.registration_type.parse()?,
        tax_regime: request.tax_regime.parse()?,
        additional_charges: request.additional_charges,
        benefits: request.benefits,
        year: request.year,
    })
}

/// Unwraps a JSON payload, turning extractor rejections into 400 responses.
fn accept<T>(
    correlation_id: Uuid,
    calculator: &str,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    info!(correlation_id = %correlation_id, calculator, "Processing calculation request");

    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };

    Err(ApiErrorResponse {
        status: StatusCode::BAD_REQUEST,
        error,
    }
    .into_response())
}

/// Serializes a calculation outcome, logging it against the correlation id.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    calculator: &str,
    start_time: Instant,
    result: EngineResult<T>,
) -> Response {
    match result {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                calculator,
                duration_us = start_time.elapsed().as_micros() as u64,
                "Calculation completed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(body),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                calculator,
                error = %err,
                "Calculation failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let tables = RuleTableProvider::load("./config/tables").expect("Failed to load tables");
        AppState::new(tables)
    }

    async fn post_json(uri: &str, body: String) -> (StatusCode, Value) {
        let router = create_router(create_test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_perform_irrf_computes_inss_when_omitted() {
        let tables = RuleTableProvider::load("./config/tables").unwrap();
        let request: IrrfRequest = serde_json::from_value(json!({
            "gross_salary": "3000.00",
            "year": 2024,
            "month": 6
        }))
        .unwrap();

        let result = perform_irrf(&request, &tables).unwrap();
        // 3000.00 - 258.82 INSS = 2741.18, second bracket: × 7.5% - 169.44
        assert_eq!(result.base_amount, Decimal::new(274118, 2));
        assert_eq!(result.amount, Decimal::new(3615, 2));
    }

    #[test]
    fn test_to_cost_params_rejects_unknown_regime() {
        let request: EmployerCostRequest = serde_json::from_value(json!({
            "gross_salary": "3000",
            "tax_regime": "mei"
        }))
        .unwrap();
        assert!(to_cost_params(&request).is_err());
    }

    #[tokio::test]
    async fn test_inss_endpoint_returns_200() {
        let (status, body) =
            post_json("/inss", json!({"gross_salary": "1412.00", "year": 2024}).to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["amount"], "105.90");
        assert_eq!(body["mode"], "progressive");
    }

    #[tokio::test]
    async fn test_calculation_error_is_json_with_status() {
        let router = create_router(create_test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/fgts")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        json!({"gross_salary": "2000", "registration_type": "autonomo"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "UNSUPPORTED_VALUE");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let (status, body) = post_json("/fgts", "{not json".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_field_returns_validation_error() {
        let (status, body) = post_json("/fgts", json!({"gross_salary": "2000"}).to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
