use axum::{body::Bytes, extract::State, Json};
use models::{ApiResponse, IdRequest, Note};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::info;

use crate::errors::ApiError;
use crate::routes::AppState;

fn parse_body<T: DeserializeOwned>(context: &str, body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::bad_json(context, e))
}

#[utoipa::path(
    post, path = "/create", tag = "notes",
    request_body = crate::openapi::NoteDoc,
    responses(
        (status = 200, description = "Successfully added", body = crate::openapi::ApiResponseDoc),
        (status = 400, description = "Required data is missing"),
        (status = 409, description = "Error in saving record")
    )
)]
pub async fn create(State(state): State<AppState>, body: Bytes) -> Result<Json<ApiResponse>, ApiError> {
    let note: Note = parse_body("notes::create", &body)?;
    let id = state
        .notes
        .create(note)
        .map_err(|e| ApiError::service("notes::create", "Error in saving record", e))?;
    Ok(Json(ApiResponse::ok("Successfully added", Some(json!({ "id": id })))))
}

#[utoipa::path(
    post, path = "/get", tag = "notes",
    request_body = crate::openapi::IdRequestDoc,
    responses(
        (status = 200, description = "Success", body = crate::openapi::ApiResponseDoc),
        (status = 400, description = "No ID provided"),
        (status = 404, description = "Error in finding records")
    )
)]
pub async fn get(State(state): State<AppState>, body: Bytes) -> Result<Json<ApiResponse>, ApiError> {
    let req: IdRequest = parse_body("notes::get", &body)?;
    let note = state
        .notes
        .get(req.id)
        .map_err(|e| ApiError::service("notes::get", "Error in finding records", e))?;
    let data = serde_json::to_value(note).map_err(|e| ApiError::bad_json("notes::get", e))?;
    Ok(Json(ApiResponse::ok("Success", Some(data))))
}

#[utoipa::path(
    post, path = "/update", tag = "notes",
    request_body = crate::openapi::NoteDoc,
    responses(
        (status = 200, description = "Success", body = crate::openapi::ApiResponseDoc),
        (status = 400, description = "Required data is missing"),
        (status = 409, description = "Error in updating record")
    )
)]
pub async fn update(State(state): State<AppState>, body: Bytes) -> Result<Json<ApiResponse>, ApiError> {
    let note: Note = parse_body("notes::update", &body)?;
    state
        .notes
        .update(note)
        .map_err(|e| ApiError::service("notes::update", "Error in updating record", e))?;
    Ok(Json(ApiResponse::ok("Success", None)))
}

#[utoipa::path(
    post, path = "/delete", tag = "notes",
    request_body = crate::openapi::IdRequestDoc,
    responses(
        (status = 200, description = "Success", body = crate::openapi::ApiResponseDoc),
        (status = 400, description = "ID is missing")
    )
)]
pub async fn delete(State(state): State<AppState>, body: Bytes) -> Result<Json<ApiResponse>, ApiError> {
    let req: IdRequest = parse_body("notes::delete", &body)?;
    state
        .notes
        .delete(req.id)
        .map_err(|e| ApiError::service("notes::delete", "Error in deleting record", e))?;
    Ok(Json(ApiResponse::ok("Success", None)))
}

#[utoipa::path(
    post, path = "/get-all", tag = "notes",
    responses(
        (status = 200, description = "Success", body = crate::openapi::ApiResponseDoc),
        (status = 404, description = "Error in finding records")
    )
)]
pub async fn get_all(State(state): State<AppState>) -> Result<Json<ApiResponse>, ApiError> {
    let notes = state
        .notes
        .list()
        .map_err(|e| ApiError::service("notes::get_all", "Error in finding records", e))?;
    info!(count = notes.len(), "list notes");
    let data = serde_json::to_value(notes).map_err(|e| ApiError::bad_json("notes::get_all", e))?;
    Ok(Json(ApiResponse::ok("Success", Some(data))))
}
