use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::{
        dto::{
            from_object, ChangePassword, CreateUser, CreateUserRequest, PasswordChangeRequest,
            PasswordChangedResponse, UpdateUser, UpdateUserRequest, UserIdResponse,
        },
        repo_types::PublicUser,
        services::{self, PASSWORD_CHANGED},
    },
};

// Each path is served with and without the trailing slash.
pub fn user_routes() -> Router<AppState> {
    let collection = || post(create_user).get(list_users);
    let password = || post(password_change);
    let member = || get(get_user).put(update_user).delete(delete_user);
    Router::new()
        .route("/users/", collection())
        .route("/users", collection())
        .route("/users/password-change/", password())
        .route("/users/password-change", password())
        .route("/users/:id/", member())
        .route("/users/:id", member())
}

// Ids that are not UUIDs can never match a row.
fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserIdResponse>)> {
    let Json(payload) = payload?;
    let input = CreateUser::try_from(from_object::<CreateUserRequest>(payload)?)?;
    let id = services::create(state.users.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(UserIdResponse { id })))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<PublicUser>>> {
    Ok(Json(services::list(state.users.as_ref()).await?))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PublicUser>> {
    let id = parse_id(&id).ok_or_else(AppError::invalid_user_id)?;
    Ok(Json(services::get(state.users.as_ref(), id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<UserIdResponse>> {
    let id = parse_id(&id).ok_or_else(AppError::invalid_user_id)?;
    let Json(payload) = payload?;
    let input = UpdateUser::try_from(from_object::<UpdateUserRequest>(payload)?)?;
    let id = services::update(state.users.as_ref(), id, input).await?;
    Ok(Json(UserIdResponse { id }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if let Some(id) = parse_id(&id) {
        services::delete(state.users.as_ref(), id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn password_change(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PasswordChangedResponse>> {
    let Json(payload) = payload?;
    let input = ChangePassword::try_from(from_object::<PasswordChangeRequest>(payload)?)?;
    let (id, email) = services::change_password(state.users.as_ref(), input).await?;
    Ok(Json(PasswordChangedResponse {
        id,
        email,
        message: PASSWORD_CHANGED,
    }))
}
