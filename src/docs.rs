// src/docs.rs

use axum::Json;
use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

// As páginas CRUD genéricas (`handlers::crud`) não entram aqui: o contrato delas
// é o mesmo para todas as coleções.
#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login_page,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_session,
        handlers::auth::get_me,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,

        // --- Técnicos ---
        handlers::tecnicos::set_password,
        handlers::tecnicos::reset_password,

        // --- Perfiles GMB ---
        handlers::perfiles::get_active_location,
        handlers::perfiles::set_active_location,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::Identity,
            models::auth::SessionSnapshot,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Dashboard ---
            models::dashboard::TimePeriod,
            models::dashboard::DashboardSummary,
            models::dashboard::ChartDataset,
            models::dashboard::ChartData,
            models::dashboard::TechnicianOption,
            models::dashboard::DashboardFilters,
            models::dashboard::DashboardResponse,
            models::nichos::CategoryRef,

            // --- Técnicos ---
            models::tecnicos::SetPasswordPayload,
            models::tecnicos::PasswordResetResponse,

            // --- Perfiles GMB ---
            models::perfiles::Location,
            models::perfiles::ActiveLocationPayload,
            models::perfiles::ActiveLocationResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Sessão do console"),
        (name = "Dashboard", description = "Painel de controle (dados de exemplo)"),
        (name = "Técnicos", description = "Conta dos técnicos no provedor de identidade"),
        (name = "Perfiles GMB", description = "Localidade ativa dos perfis GMB")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

// GET /api-docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
