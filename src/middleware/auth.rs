// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use serde_json::json;

use crate::{
    common::error::AppError,
    models::auth::{Identity, SessionSnapshot},
    services::session::SessionStore,
};

/// Entrada de login para onde os visitantes sem sessão são mandados.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq)]
pub enum GuardState {
    Loading,
    Authenticated(Identity),
    Unauthenticated,
}

impl GuardState {
    /// `loading` manda em tudo; depois disso, só importa se há usuário.
    /// Qualquer papel passa: não há níveis de acesso.
    pub fn evaluate(snapshot: &SessionSnapshot) -> Self {
        if snapshot.loading {
            return Self::Loading;
        }
        match &snapshot.user {
            Some(user) => Self::Authenticated(user.clone()),
            None => Self::Unauthenticated,
        }
    }
}

// O middleware em si
pub async fn session_guard(
    State(session): State<SessionStore>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let snapshot = session.snapshot()?;

    match GuardState::evaluate(&snapshot) {
        GuardState::Loading => Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::RETRY_AFTER, "1")],
            Json(json!({ "state": "loading" })),
        )
            .into_response()),

        GuardState::Unauthenticated => Ok(Redirect::to(LOGIN_PATH).into_response()),

        GuardState::Authenticated(user) => {
            // A requisição precisa trazer o token da sessão atual.
            let bearer = request.headers().typed_get::<Authorization<Bearer>>();
            let presented = bearer.as_ref().map(|auth| auth.token());

            if presented.is_none() || presented != snapshot.access_token.as_deref() {
                tracing::debug!("Token ausente ou de outra sessão: redirecionando para o login");
                return Ok(Redirect::to(LOGIN_PATH).into_response());
            }

            // Insere o usuário nos "extensions" da requisição
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
    }
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub Identity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}
