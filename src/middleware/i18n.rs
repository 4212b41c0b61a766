// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

// Nosso extrator de idioma.
// String vazia = sem preferência: o `I18nStore` usa o idioma padrão configurado.
#[derive(Debug, Clone, Default)]
pub struct Locale(pub String);

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let lang = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first() // Pega o idioma preferido (ex: "es-ES")
                    .map(|tag_string| {
                        // "es-ES" -> "es" ; "pt" -> "pt"
                        tag_string.split('-').next().unwrap_or(tag_string).to_ascii_lowercase()
                    })
            })
            .unwrap_or_default();

        Ok(Locale(lang))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Locale {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(header::ACCEPT_LANGUAGE, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Locale::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn takes_primary_subtag_of_preferred_language() {
        assert_eq!(extract(Some("pt-BR,pt;q=0.9,en;q=0.8")).await.0, "pt");
        assert_eq!(extract(Some("en-US")).await.0, "en");
    }

    #[tokio::test]
    async fn missing_header_means_no_preference() {
        assert_eq!(extract(None).await.0, "");
    }
}
