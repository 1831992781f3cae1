//! User administration endpoints
//!
//! All routes require a bearer token. The merchant scope comes from the
//! token, never from the request.
//!
//! Each handler runs its service call under a request cancellation token
//! that fires when the handler future is dropped (timeout or client
//! disconnect) or when the server shuts down.

use crate::auth::AuthUser;
use crate::error::ServiceResult;
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use pos_shared::validation::MAX_PAGE_LIMIT;
use pos_shared::{CreateUserRequest, CreateUserResponse, ListUsersQuery, User, UsersPage};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/:id", get(get_user).delete(delete_user))
}

/// POST /api/users
async fn create_user(
    State(state): State<AppState>,
    caller: AuthUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ServiceResult<(StatusCode, Json<CreateUserResponse>)> {
    let Json(req) = payload?;

    let cancel = state.request_token();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let id = state
        .user_admin()
        .create_user(&cancel, caller.merchant_id, req)
        .await?;
    let user = state.user_admin().get_user(&cancel, &caller, id).await?;

    Ok((StatusCode::CREATED, Json(CreateUserResponse { user })))
}

/// GET /api/users?limit=&lastID=&page=
async fn list_users(
    State(state): State<AppState>,
    caller: AuthUser,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> ServiceResult<Json<UsersPage>> {
    let Query(query) = query?;
    let mut cursor = query.cursor()?;
    cursor.limit = cursor.limit.min(MAX_PAGE_LIMIT);
    let page = query.page()?;

    let cancel = state.request_token();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let (users, total_data) = state
        .user_admin()
        .list_users(&cancel, caller.merchant_id, cursor)
        .await?;

    Ok(Json(UsersPage {
        users,
        page,
        total_data,
    }))
}

/// GET /api/users/:id
async fn get_user(
    State(state): State<AppState>,
    caller: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> ServiceResult<Json<User>> {
    let Path(id) = id?;

    let cancel = state.request_token();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let user = state.user_admin().get_user(&cancel, &caller, id).await?;
    Ok(Json(user))
}

/// DELETE /api/users/:id
async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> ServiceResult<StatusCode> {
    let Path(id) = id?;

    let cancel = state.request_token();
    let _cancel_on_drop = cancel.clone().drop_guard();

    state.user_admin().delete_user(&cancel, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
