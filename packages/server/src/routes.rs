//! HTTP handlers for the resource endpoints

use crate::db::queries;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use quire_common::{
    Ack, DocumentPatch, DocumentRecord, DocumentSummary, NewDocument, NewSection, NewSubsection,
    SectionPatch, SectionRecord, SubsectionPatch, SubsectionRecord,
};

type ApiResult<T> = Result<T, ApiError>;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/documents", get(list_documents).post(create_document))
        .route(
            "/documents/:id",
            get(get_document).patch(update_document).delete(delete_document),
        )
        .route("/sections", axum::routing::post(create_section))
        .route(
            "/sections/:id",
            get(get_section).patch(update_section).delete(delete_section),
        )
        .route("/subsections", axum::routing::post(create_subsection))
        .route(
            "/subsections/:id",
            get(get_subsection)
                .patch(update_subsection)
                .delete(delete_subsection),
        )
}

fn ack(message: &str) -> Json<Ack> {
    Json(Ack {
        message: message.to_string(),
    })
}

// ============================================================================
// Documents
// ============================================================================

async fn list_documents(State(state): State<AppState>) -> ApiResult<Json<Vec<DocumentSummary>>> {
    let docs = state
        .db
        .call(|conn| queries::list_documents(conn))
        .await
        .map_err(ApiError::from_db("Failed to fetch documents"))?;
    Ok(Json(docs))
}

async fn create_document(
    State(state): State<AppState>,
    payload: Result<Json<NewDocument>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DocumentSummary>)> {
    let Json(input) = payload?;
    let doc = state
        .db
        .call(move |conn| queries::insert_document(conn, &input))
        .await
        .map_err(ApiError::from_db("Failed to create document"))?;
    tracing::info!(id = %doc.id, "document created");
    Ok((StatusCode::CREATED, Json(doc)))
}

async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DocumentRecord>> {
    let doc = state
        .db
        .call(move |conn| queries::load_document(conn, &id))
        .await
        .map_err(ApiError::from_db("Failed to fetch document"))?;
    Ok(Json(doc))
}

async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<DocumentPatch>, JsonRejection>,
) -> ApiResult<Json<DocumentRecord>> {
    let Json(patch) = payload?;
    let doc = state
        .db
        .call(move |conn| queries::update_document(conn, &id, &patch))
        .await
        .map_err(ApiError::from_db("Failed to update document"))?;
    Ok(Json(doc))
}

async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Ack>> {
    state
        .db
        .call(move |conn| queries::delete_document(conn, &id))
        .await
        .map_err(ApiError::from_db("Failed to delete document"))?;
    Ok(ack("Document deleted successfully"))
}

// ============================================================================
// Sections
// ============================================================================

async fn create_section(
    State(state): State<AppState>,
    payload: Result<Json<NewSection>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SectionRecord>)> {
    let Json(input) = payload?;
    let section = state
        .db
        .call(move |conn| queries::insert_section(conn, &input))
        .await
        .map_err(ApiError::from_db("Failed to create section"))?;
    Ok((StatusCode::CREATED, Json(section)))
}

async fn get_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SectionRecord>> {
    let section = state
        .db
        .call(move |conn| queries::load_section(conn, &id))
        .await
        .map_err(ApiError::from_db("Failed to fetch section"))?;
    Ok(Json(section))
}

async fn update_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SectionPatch>, JsonRejection>,
) -> ApiResult<Json<SectionRecord>> {
    let Json(patch) = payload?;
    let section = state
        .db
        .call(move |conn| queries::update_section(conn, &id, &patch))
        .await
        .map_err(ApiError::from_db("Failed to update section"))?;
    Ok(Json(section))
}

async fn delete_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Ack>> {
    state
        .db
        .call(move |conn| queries::delete_section(conn, &id))
        .await
        .map_err(ApiError::from_db("Failed to delete section"))?;
    Ok(ack("Section deleted successfully"))
}

// ============================================================================
// Subsections
// ============================================================================

async fn create_subsection(
    State(state): State<AppState>,
    payload: Result<Json<NewSubsection>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubsectionRecord>)> {
    let Json(input) = payload?;
    let subsection = state
        .db
        .call(move |conn| queries::insert_subsection(conn, &input))
        .await
        .map_err(ApiError::from_db("Failed to create subsection"))?;
    Ok((StatusCode::CREATED, Json(subsection)))
}

async fn get_subsection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SubsectionRecord>> {
    let subsection = state
        .db
        .call(move |conn| queries::load_subsection(conn, &id))
        .await
        .map_err(ApiError::from_db("Failed to fetch subsection"))?;
    Ok(Json(subsection))
}

async fn update_subsection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SubsectionPatch>, JsonRejection>,
) -> ApiResult<Json<SubsectionRecord>> {
    let Json(patch) = payload?;
    let subsection = state
        .db
        .call(move |conn| queries::update_subsection(conn, &id, &patch))
        .await
        .map_err(ApiError::from_db("Failed to update subsection"))?;
    Ok(Json(subsection))
}

async fn delete_subsection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Ack>> {
    state
        .db
        .call(move |conn| queries::delete_subsection(conn, &id))
        .await
        .map_err(ApiError::from_db("Failed to delete subsection"))?;
    Ok(ack("Subsection deleted successfully"))
}
