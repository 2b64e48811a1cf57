use axum::{extract::State, http::StatusCode, Json};
use tracing::instrument;

use crate::error::ErrorResponse;
use crate::i18n::Translator;
use crate::state::AppState;
use crate::users::dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::users::service;

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    t: Translator,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ErrorResponse> {
    let user = service::register(&state, &payload.username, &payload.email, &payload.password)
        .await
        .map_err(|e| e.localize(&t))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: t.t("welcome"),
            username: user.username,
            email: user.email,
            user_id: user.id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    t: Translator,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ErrorResponse> {
    let (user, token) = service::login(&state, &payload.identifier, &payload.password)
        .await
        .map_err(|e| e.localize(&t))?;

    Ok(Json(LoginResponse {
        message: t.t("login"),
        username: user.username,
        email: user.email,
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn register_response_uses_camel_case_and_omits_secrets() {
        let response = RegisterResponse {
            message: "ok".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            user_id: Uuid::new_v4(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"userId\""));
        assert!(!json.contains("password"));
    }

    #[test]
    fn login_response_carries_the_token() {
        let response = LoginResponse {
            message: "ok".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            token: "header.payload.sig".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("header.payload.sig"));
    }
}
