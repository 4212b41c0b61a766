use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, db::entity_store::RecordId, middleware::i18n::Locale};

// Erros do provedor de identidade (credenciais, tokens, armazenamento da sessão).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Conta não encontrada: {0}")]
    UnknownAccount(String),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Falha ao gravar a sessão: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("Sessão persistida inválida: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("A conta {0} pertence a outro papel")]
    RoleMismatch(String),

    #[error("Provedor de identidade indisponível: {0}")]
    Unavailable(String),
}

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{resource} #{id} não encontrado")]
    NotFound { resource: &'static str, id: RecordId },

    #[error("Falha de autenticação: {0}")]
    AuthenticationError(#[from] AuthError),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Nenhuma localidade ativa")]
    NoActiveLocation,

    #[error("Nenhum registro em edição")]
    NoEditInProgress,

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

// A rejeição HTTP já traduzida
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AuthenticationError(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            AppError::AuthenticationError(AuthError::UnknownAccount(_)) => StatusCode::NOT_FOUND,
            AppError::AuthenticationError(AuthError::RoleMismatch(_)) => StatusCode::CONFLICT,
            AppError::AuthenticationError(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::NoActiveLocation | AppError::NoEditInProgress => StatusCode::CONFLICT,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation",
            AppError::NotFound { .. } => "not_found",
            AppError::AuthenticationError(AuthError::InvalidCredentials) => "invalid_credentials",
            AppError::AuthenticationError(AuthError::UnknownAccount(_)) => "unknown_account",
            AppError::AuthenticationError(AuthError::RoleMismatch(_)) => "role_mismatch",
            AppError::AuthenticationError(_) => "identity_unavailable",
            AppError::InvalidToken => "invalid_token",
            AppError::NoActiveLocation => "no_active_location",
            AppError::NoEditInProgress => "no_edit_in_progress",
            AppError::InternalServerError(_) => "internal",
        }
    }

    /// Converte para a resposta HTTP no idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, i18n_store: &I18nStore) -> ApiError {
        self.render(&locale.0, i18n_store)
    }

    fn render(self, lang: &str, i18n_store: &I18nStore) -> ApiError {
        let status = self.status();
        let error = i18n_store.get(lang, self.message_key());

        let details = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(details))
            }
            AppError::NotFound { resource, id } => Some(json!({ "resource": resource, "id": id })),
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            e @ (AppError::AuthenticationError(_) | AppError::InternalServerError(_))
                if status.is_server_error() =>
            {
                tracing::error!("Erro Interno do Servidor: {}", e);
                None
            }
            _ => None,
        };

        ApiError { status, error, details }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Sem `Locale` à mão (middlewares): usa o idioma padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let i18n_store = I18nStore::default();
        let lang = i18n_store.default_lang().to_string();
        self.render(&lang, &i18n_store).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::validation::field_error;

    fn locale(lang: &str) -> Locale {
        Locale(lang.to_string())
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let err = AppError::ValidationError(field_error("email", "email", "El e-mail no es válido.".into()));
        let api = err.to_api_error(&locale("es"), &I18nStore::default());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "Uno o más campos no son válidos.");
        let details = api.details.unwrap();
        assert_eq!(details["email"][0], "El e-mail no es válido.");
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        let store = I18nStore::default();
        let not_found = AppError::NotFound { resource: "technician", id: 3 };
        assert_eq!(not_found.to_api_error(&locale("en"), &store).status, StatusCode::NOT_FOUND);

        let bad_login = AppError::from(AuthError::InvalidCredentials);
        let api = bad_login.to_api_error(&locale("pt"), &store);
        assert_eq!(api.status, StatusCode::UNAUTHORIZED);
        assert_eq!(api.error, "E-mail ou senha inválidos.");

        let outage = AppError::from(AuthError::Unavailable("timeout".into()));
        assert_eq!(outage.to_api_error(&locale("es"), &store).status, StatusCode::BAD_GATEWAY);

        assert_eq!(
            AppError::NoActiveLocation.to_api_error(&locale("es"), &store).status,
            StatusCode::CONFLICT
        );
    }
}
