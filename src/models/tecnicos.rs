// src/models/tecnicos.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::validation::validate_percentage,
    db::entity_store::{dedup_ids, trimmed, Draft, Record, RecordId},
    models::nichos::CategoryRef,
};

// --- Técnico ---
// A ligação com uma conta do provedor de identidade é apenas o e-mail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Technician {
    pub id: RecordId,

    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,

    #[validate(length(min = 1, message = "El teléfono es obligatorio."))]
    pub phone: String,

    #[validate(email(message = "El e-mail no es válido."))]
    pub email: String,

    // Ids de nichos (conjunto, sem repetição)
    pub nichos: Vec<RecordId>,

    #[validate(custom(function = "validate_percentage"))]
    pub commission: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianDraft {
    #[validate(required(message = "El campo 'name' es obligatorio."))]
    pub name: Option<String>,

    #[validate(required(message = "El campo 'phone' es obligatorio."))]
    pub phone: Option<String>,

    #[validate(required(message = "El campo 'email' es obligatorio."))]
    pub email: Option<String>,

    pub nichos: Option<Vec<RecordId>>,

    #[validate(required(message = "El campo 'commission' es obligatorio."))]
    pub commission: Option<Decimal>,
}

impl Draft for TechnicianDraft {
    fn overlay(&mut self, other: Self) {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.phone.is_some() {
            self.phone = other.phone;
        }
        if other.email.is_some() {
            self.email = other.email;
        }
        if other.nichos.is_some() {
            self.nichos = other.nichos;
        }
        if other.commission.is_some() {
            self.commission = other.commission;
        }
    }
}

impl Record for Technician {
    type Draft = TechnicianDraft;
    const KIND: &'static str = "technician";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: TechnicianDraft) -> Self {
        Self {
            id,
            name: draft.name.map(trimmed).unwrap_or_default(),
            phone: draft.phone.map(trimmed).unwrap_or_default(),
            email: draft.email.map(trimmed).unwrap_or_default(),
            nichos: dedup_ids(draft.nichos.unwrap_or_default()),
            commission: draft.commission.unwrap_or_default(),
        }
    }

    fn merge(&self, draft: TechnicianDraft) -> Self {
        Self {
            id: self.id,
            name: draft.name.map(trimmed).unwrap_or_else(|| self.name.clone()),
            phone: draft.phone.map(trimmed).unwrap_or_else(|| self.phone.clone()),
            email: draft.email.map(trimmed).unwrap_or_else(|| self.email.clone()),
            nichos: draft
                .nichos
                .map(dedup_ids)
                .unwrap_or_else(|| self.nichos.clone()),
            commission: draft.commission.unwrap_or(self.commission),
        }
    }

    fn to_draft(&self) -> TechnicianDraft {
        TechnicianDraft {
            name: Some(self.name.clone()),
            phone: Some(self.phone.clone()),
            email: Some(self.email.clone()),
            nichos: Some(self.nichos.clone()),
            commission: Some(self.commission),
        }
    }
}

// --- Linha da listagem (nichos resolvidos na leitura) ---
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianEntry {
    pub id: RecordId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub nichos: Vec<CategoryRef>,
    pub commission: Decimal,
}

// --- Payload: definir senha da conta do técnico ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetPasswordPayload {
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetResponse {
    pub email: String,
    pub temporary_password: String,
}
