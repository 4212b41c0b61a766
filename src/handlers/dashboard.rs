// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::dashboard::{DashboardQuery, DashboardResponse},
};

// GET /api/dashboard?timePeriod=monthly&nicho=all&technician=1
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    params(
        ("timePeriod" = Option<String>, Query, description = "daily | weekly | monthly"),
        ("nicho" = Option<String>, Query, description = "all | id do nicho"),
        ("technician" = Option<String>, Query, description = "all | id do técnico")
    ),
    responses(
        (status = 200, description = "Contagens, série de exemplo e opções de filtro", body = DashboardResponse),
        (status = 400, description = "Filtro malformado"),
        (status = 404, description = "Nicho ou técnico inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let dashboard = app_state
        .dashboard_service
        .get_dashboard(query)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(dashboard)))
}
