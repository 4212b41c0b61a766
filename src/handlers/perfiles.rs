// src/handlers/perfiles.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::perfiles::{ActiveLocationPayload, ActiveLocationResponse},
};

// GET /api/perfiles-gmb/active-location
#[utoipa::path(
    get,
    path = "/api/perfiles-gmb/active-location",
    tag = "Perfiles GMB",
    responses(
        (status = 200, description = "Localidade ativa (ou null)", body = ActiveLocationResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_active_location(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let active_location = app_state
        .listing_service
        .active_location()
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ActiveLocationResponse { active_location })))
}

// PUT /api/perfiles-gmb/active-location
#[utoipa::path(
    put,
    path = "/api/perfiles-gmb/active-location",
    tag = "Perfiles GMB",
    request_body = ActiveLocationPayload,
    responses(
        (status = 200, description = "Localidade ativa trocada", body = ActiveLocationResponse),
        (status = 404, description = "Localidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_active_location(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ActiveLocationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let location = app_state
        .listing_service
        .set_active_location(payload.location_id)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(ActiveLocationResponse { active_location: Some(location) }),
    ))
}
