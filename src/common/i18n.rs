// src/common/i18n.rs

use std::collections::HashMap;

// Mensagens de erro por idioma: (chave, es, pt, en)
const MESSAGES: &[(&str, &str, &str, &str)] = &[
    (
        "validation",
        "Uno o más campos no son válidos.",
        "Um ou mais campos são inválidos.",
        "One or more fields are invalid.",
    ),
    (
        "not_found",
        "Registro no encontrado.",
        "Registro não encontrado.",
        "Record not found.",
    ),
    (
        "invalid_credentials",
        "E-mail o contraseña no válidos.",
        "E-mail ou senha inválidos.",
        "Invalid e-mail or password.",
    ),
    (
        "invalid_token",
        "Token de autenticación no válido o ausente.",
        "Token de autenticação inválido ou ausente.",
        "Missing or invalid authentication token.",
    ),
    (
        "unknown_account",
        "No existe una cuenta con ese e-mail.",
        "Não existe conta com esse e-mail.",
        "No account exists for that e-mail.",
    ),
    (
        "role_mismatch",
        "Ese e-mail pertenece a una cuenta con otro rol.",
        "Esse e-mail pertence a uma conta com outro papel.",
        "That e-mail belongs to an account with another role.",
    ),
    (
        "identity_unavailable",
        "El proveedor de identidad no está disponible.",
        "O provedor de identidade está indisponível.",
        "The identity provider is unavailable.",
    ),
    (
        "no_active_location",
        "Seleccione una localidad antes de gestionar perfiles.",
        "Selecione uma localidade antes de gerir perfis.",
        "Select a location before managing profiles.",
    ),
    (
        "no_edit_in_progress",
        "No hay ningún registro en edición.",
        "Nenhum registro em edição.",
        "No record is being edited.",
    ),
    (
        "internal",
        "Ocurrió un error inesperado.",
        "Ocorreu um erro inesperado.",
        "An unexpected error occurred.",
    ),
];

pub const SUPPORTED_LANGUAGES: &[&str] = &["es", "pt", "en"];

/// Tabela de mensagens traduzidas, carregada uma vez no `AppState`.
#[derive(Debug, Clone)]
pub struct I18nStore {
    default_lang: String,
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new(default_lang: &str) -> Self {
        let mut messages: HashMap<&'static str, HashMap<&'static str, &'static str>> =
            HashMap::new();
        for &(key, es, pt, en) in MESSAGES {
            for (lang, text) in [("es", es), ("pt", pt), ("en", en)] {
                messages.entry(lang).or_default().insert(key, text);
            }
        }

        let default_lang = if SUPPORTED_LANGUAGES.contains(&default_lang) {
            default_lang.to_string()
        } else {
            "es".to_string()
        };

        Self { default_lang, messages }
    }

    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    /// Idioma pedido, senão o padrão, senão a própria chave.
    pub fn get(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(lang)
            .and_then(|table| table.get(key))
            .or_else(|| {
                self.messages
                    .get(self.default_lang.as_str())
                    .and_then(|table| table.get(key))
            })
            .map(|text| text.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new("es")
    }
}
