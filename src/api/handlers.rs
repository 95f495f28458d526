//! HTTP request handlers for the Salary Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{EmployeeUpdate, NewEmployee, SalaryInput};
use crate::session::Validated;

use super::request::{CalculationRequest, LicenseRequest, SelectionRequest};
use super::response::{ApiError, ApiErrorResponse, CurrentSelection};
use super::state::AppState;

type HandlerResult = Result<Response, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/:id", get(get_employee).patch(update_employee))
        .route("/employees/:id/payments", post(save_payment))
        .route("/employees/:id/history", get(payment_history))
        .route("/session/current", get(current_selection).put(select_employee))
        .route(
            "/license",
            get(license_status).post(validate_license).delete(clear_license),
        )
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Unwraps a JSON body, mapping rejections to a 400 error.
fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
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
    Err(ApiErrorResponse::new(StatusCode::BAD_REQUEST, error))
}

fn employee_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiErrorResponse> {
    path.map(|Path(id)| id).map_err(|rejection| {
        ApiErrorResponse::new(
            StatusCode::BAD_REQUEST,
            ApiError::invalid_id(rejection.body_text()),
        )
    })
}

fn validation_failed(errors: Vec<crate::models::FieldError>) -> ApiErrorResponse {
    ApiErrorResponse::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        ApiError::validation_failed(errors),
    )
}

/// Handler for POST /calculate endpoint.
///
/// Validates the three figures and returns the result with its breakdown,
/// budget health and formatted values.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> HandlerResult {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = json_body(payload, correlation_id)?;
    let input = SalaryInput::from(&request);

    let start_time = Instant::now();
    match state.session().calculate(&input) {
        Validated::Valid(report) => {
            info!(
                correlation_id = %correlation_id,
                current_salary = %report.result.current_salary,
                status = ?report.result.status,
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            );
            Ok(json_response(StatusCode::OK, report))
        }
        Validated::Invalid(errors) => {
            warn!(
                correlation_id = %correlation_id,
                error_count = errors.len(),
                "Calculation input rejected"
            );
            Err(validation_failed(errors))
        }
    }
}

async fn list_employees(State(state): State<AppState>) -> HandlerResult {
    let employees = state.session().repository().list().await;
    Ok(json_response(StatusCode::OK, employees))
}

async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<NewEmployee>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let new = json_body(payload, correlation_id)?;
    let employee = state.session().repository().create(new).await?;
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee.id,
        "Employee created"
    );
    Ok(json_response(StatusCode::CREATED, employee))
}

async fn get_employee(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let id = employee_id(path)?;
    match state.session().repository().get(id).await {
        Some(employee) => Ok(json_response(StatusCode::OK, employee)),
        None => Err(crate::error::EngineError::EmployeeNotFound { id }.into()),
    }
}

async fn update_employee(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<EmployeeUpdate>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = employee_id(path)?;
    let update = json_body(payload, correlation_id)?;
    let employee = state.session().repository().update(id, update).await?;
    Ok(json_response(StatusCode::OK, employee))
}

/// Handler for POST /employees/{id}/payments.
///
/// Calculates the request and appends the result to the employee's history.
async fn save_payment(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = employee_id(path)?;
    let request = json_body(payload, correlation_id)?;
    let input = SalaryInput::from(&request);

    match state.session().save_payment(id, &input).await {
        Ok(Validated::Valid(saved)) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %id,
                record_id = %saved.record.id,
                "Payment saved"
            );
            Ok(json_response(StatusCode::CREATED, saved))
        }
        Ok(Validated::Invalid(errors)) => Err(validation_failed(errors)),
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                employee_id = %id,
                error = %err,
                "Saving payment failed"
            );
            Err(err.into())
        }
    }
}

/// Handler for GET /employees/{id}/history. Requires a license.
async fn payment_history(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let id = employee_id(path)?;
    let history = state.session().history(id).await?;
    Ok(json_response(StatusCode::OK, history))
}

async fn current_selection(State(state): State<AppState>) -> HandlerResult {
    let employee = state.session().repository().current().await;
    Ok(json_response(StatusCode::OK, CurrentSelection { employee }))
}

async fn select_employee(
    State(state): State<AppState>,
    payload: Result<Json<SelectionRequest>, JsonRejection>,
) -> HandlerResult {
    let request = json_body(payload, Uuid::new_v4())?;
    let employee = state
        .session()
        .repository()
        .select(request.employee_id)
        .await?;
    Ok(json_response(StatusCode::OK, CurrentSelection { employee }))
}

async fn license_status(State(state): State<AppState>) -> HandlerResult {
    let status = state.session().gate().status().await;
    Ok(json_response(StatusCode::OK, status))
}

/// Handler for POST /license.
///
/// Returns the new status on success; a rejected key answers 422 with the
/// message shown to the user.
async fn validate_license(
    State(state): State<AppState>,
    payload: Result<Json<LicenseRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let gate = state.session().gate();

    if gate.validate(&request.key).await {
        return Ok(json_response(StatusCode::OK, gate.status().await));
    }

    let status = gate.status().await;
    warn!(correlation_id = %correlation_id, "License key rejected");
    Err(ApiErrorResponse::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        ApiError::new(
            "LICENSE_REJECTED",
            status.error.unwrap_or_else(|| "Invalid license key.".to_string()),
        ),
    ))
}

async fn clear_license(State(state): State<AppState>) -> HandlerResult {
    let gate = state.session().gate();
    gate.clear().await?;
    Ok(json_response(StatusCode::OK, gate.status().await))
}
