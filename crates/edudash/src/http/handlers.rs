use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use super::response::{ApiError, ApiResponse};
use super::AppState;
use crate::error::Error;
use crate::student::{StudentDraft, StudentRecord};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn draft_from(body: Result<Json<StudentDraft>, JsonRejection>) -> Result<StudentDraft, Error> {
    body.map(|Json(draft)| draft)
        .map_err(|rejection| Error::invalid_body(rejection.body_text()))
}

pub(crate) async fn list_students(State(state): State<AppState>) -> ApiResult<Vec<StudentRecord>> {
    let students = state
        .service
        .list()
        .await
        .map_err(|e| ApiError::from_error(&e, "Failed to fetch students"))?;
    Ok(Json(ApiResponse::list(students)))
}

pub(crate) async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StudentRecord> {
    let student = state
        .service
        .get(&id)
        .await
        .map_err(|e| ApiError::from_error(&e, "Failed to fetch student"))?;
    Ok(Json(ApiResponse::data(student)))
}

pub(crate) async fn create_student(
    State(state): State<AppState>,
    body: Result<Json<StudentDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const FAILURE: &str = "Failed to create student";

    let draft = draft_from(body).map_err(|e| ApiError::from_error(&e, FAILURE))?;
    let student = state
        .service
        .create(draft)
        .await
        .map_err(|e| ApiError::from_error(&e, FAILURE))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            student,
            "Student created successfully",
        )),
    ))
}

pub(crate) async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StudentDraft>, JsonRejection>,
) -> ApiResult<StudentRecord> {
    const FAILURE: &str = "Failed to update student";

    let draft = draft_from(body).map_err(|e| ApiError::from_error(&e, FAILURE))?;
    let student = state
        .service
        .update(&id, draft)
        .await
        .map_err(|e| ApiError::from_error(&e, FAILURE))?;
    Ok(Json(ApiResponse::with_message(
        student,
        "Student updated successfully",
    )))
}

pub(crate) async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StudentRecord> {
    let student = state
        .service
        .remove(&id)
        .await
        .map_err(|e| ApiError::from_error(&e, "Failed to delete student"))?;
    Ok(Json(ApiResponse::with_message(
        student,
        "Student deleted successfully",
    )))
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthBody {
    success: bool,
    message: &'static str,
    timestamp: String,
    version: &'static str,
}

pub(crate) async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        success: true,
        message: "Server is running",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub(crate) async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::new(
        StatusCode::NOT_FOUND,
        "Route not found",
        format!("no route for {method} {}", uri.path()),
    )
}
