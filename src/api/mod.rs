use axum::Json;
use axum::extract::{Path, Query};
use axum::http::{HeaderValue, Method};
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::models::*;
use crate::services::BulkCreateResult;
use crate::state::AppState;
use crate::validation::Level;

#[derive(Deserialize)]
struct BulkCreateRequest {
    #[serde(default)]
    classes: Vec<Value>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/levels", get(list_levels))
        .route("/classes", get(list_classes).post(create_class))
        .route("/classes/bulk", post(bulk_create_classes))
        .route("/classes/{id}", get(get_class))
        .route("/classes/{id}/enroll", post(enroll_student))
        .route("/classes/{id}/students", get(list_students))
        .route("/quizzes", get(list_quizzes).post(create_quiz))
        .route("/quizzes/{id}", get(get_quiz));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Permissive when no origins are configured.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.catalog.store().ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn list_levels() -> Json<Value> {
    Json(json!({ "levels": Level::ALL }))
}

async fn list_classes(
    State(state): State<AppState>,
    Query(filter): Query<ClassFilter>,
) -> Result<Json<Vec<ClassRecord>>, AppError> {
    let classes = state.catalog.get_classes(&filter).await?;
    Ok(Json(classes))
}

async fn create_class(
    State(state): State<AppState>,
    Json(req): Json<NewClassRequest>,
) -> Result<(StatusCode, Json<ClassRecord>), AppError> {
    let class = state.catalog.create_class_request(req).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

async fn bulk_create_classes(
    State(state): State<AppState>,
    Json(req): Json<BulkCreateRequest>,
) -> (StatusCode, Json<BulkCreateResult>) {
    let result = state.catalog.bulk_create(req.classes).await;
    (StatusCode::CREATED, Json(result))
}

async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClassRecord>, AppError> {
    let class = state.catalog.get_class(&id).await?;
    Ok(Json(class))
}

async fn enroll_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EnrollRequest>,
) -> Result<Json<EnrollmentConfirmation>, AppError> {
    let confirmation = state.catalog.enroll_request(&id, &req.student_name).await?;
    Ok(Json(confirmation))
}

async fn list_students(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClassRoster>, AppError> {
    let roster = state.catalog.list_students(&id).await?;
    Ok(Json(roster))
}

async fn create_quiz(
    State(state): State<AppState>,
    Json(req): Json<NewQuizRequest>,
) -> Result<(StatusCode, Json<Quiz>), AppError> {
    let id = state.quizzes.create_quiz(req).await?;
    let quiz = state.quizzes.get_quiz(&id).await?.ok_or(AppError::NotFound)?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

async fn list_quizzes(State(state): State<AppState>) -> Result<Json<Vec<QuizSummary>>, AppError> {
    let quizzes = state.quizzes.list_quizzes().await?;
    Ok(Json(quizzes))
}

async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Quiz>, AppError> {
    let quiz = state.quizzes.get_quiz(&id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(quiz))
}
