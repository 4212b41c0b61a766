// src/handlers/tecnicos.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    db::entity_store::RecordId,
    middleware::i18n::Locale,
    models::{
        auth::Identity,
        tecnicos::{PasswordResetResponse, SetPasswordPayload},
    },
};

// PUT /api/tecnicos/{id}/password
#[utoipa::path(
    put,
    path = "/api/tecnicos/{id}/password",
    tag = "Técnicos",
    request_body = SetPasswordPayload,
    params(("id" = u32, Path, description = "ID do técnico")),
    responses(
        (status = 200, description = "Conta do técnico criada ou atualizada", body = Identity),
        (status = 400, description = "Senha inválida"),
        (status = 404, description = "Técnico não encontrado"),
        (status = 409, description = "O e-mail pertence a uma conta com outro papel")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_password(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<RecordId>,
    Json(payload): Json<SetPasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let account = app_state
        .technician_service
        .set_password(app_state.identity.as_ref(), id, &payload.password)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(account)))
}

// POST /api/tecnicos/{id}/password/reset
#[utoipa::path(
    post,
    path = "/api/tecnicos/{id}/password/reset",
    tag = "Técnicos",
    params(("id" = u32, Path, description = "ID do técnico")),
    responses(
        (status = 200, description = "Senha temporária gerada", body = PasswordResetResponse),
        (status = 404, description = "Técnico ou conta não encontrados"),
        (status = 409, description = "O e-mail pertence a uma conta com outro papel")
    ),
    security(("api_jwt" = []))
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<RecordId>,
) -> Result<impl IntoResponse, ApiError> {
    let reset = app_state
        .technician_service
        .reset_password(app_state.identity.as_ref(), id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(reset)))
}
