//! Login endpoint

use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use pos_shared::{LoginRequest, LoginResponse};
use validator::Validate;

const TOKEN_TYPE: &str = "Bearer";

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Exchange email and password for an access token
///
/// POST /api/login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ServiceResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    req.validate().map_err(ServiceError::from)?;

    let cancel = state.request_token();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let issued = state
        .auth()
        .login(&cancel, &req.email, &req.password)
        .await?;

    Ok(Json(LoginResponse {
        access_token: issued.token,
        token_type: TOKEN_TYPE.to_string(),
        token_expires_in: issued.expires_at,
    }))
}
