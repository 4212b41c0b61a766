// src/models/perfiles.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::validation::validate_not_negative,
    db::entity_store::{trimmed, Draft, Record, RecordId},
};

// ---
// 1. Location (A "Localidade")
// ---
// Chave de partição dos perfis GMB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: RecordId,
    #[validate(length(min = 1, message = "El nombre de la localidad es obligatorio."))]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LocationDraft {
    #[validate(required(message = "El campo 'name' es obligatorio."))]
    pub name: Option<String>,
}

impl Draft for LocationDraft {
    fn overlay(&mut self, other: Self) {
        if other.name.is_some() {
            self.name = other.name;
        }
    }
}

impl Record for Location {
    type Draft = LocationDraft;
    const KIND: &'static str = "location";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: LocationDraft) -> Self {
        Self {
            id,
            name: draft.name.map(trimmed).unwrap_or_default(),
        }
    }

    fn merge(&self, draft: LocationDraft) -> Self {
        Self {
            id: self.id,
            name: draft
                .name
                .map(trimmed)
                .unwrap_or_else(|| self.name.clone()),
        }
    }

    fn to_draft(&self) -> LocationDraft {
        LocationDraft { name: Some(self.name.clone()) }
    }
}

// ---
// 2. Profile (O "Perfil GMB")
// ---
// Pertence a exatamente uma localidade. `technician` é o nome de exibição, não um id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: RecordId,

    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,

    #[validate(url(message = "La URL del perfil no es válida."))]
    pub url: String,

    #[validate(length(min = 1, message = "El teléfono es obligatorio."))]
    pub phone: String,

    #[validate(length(min = 1, message = "El técnico es obligatorio."))]
    pub technician: String,

    // €/aviso
    #[validate(custom(function = "validate_not_negative"))]
    pub price_per_call: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    #[validate(required(message = "El campo 'name' es obligatorio."))]
    pub name: Option<String>,

    #[validate(required(message = "El campo 'url' es obligatorio."))]
    pub url: Option<String>,

    #[validate(required(message = "El campo 'phone' es obligatorio."))]
    pub phone: Option<String>,

    #[validate(required(message = "El campo 'technician' es obligatorio."))]
    pub technician: Option<String>,

    #[validate(required(message = "El campo 'pricePerCall' es obligatorio."))]
    pub price_per_call: Option<Decimal>,
}

impl Draft for ProfileDraft {
    fn overlay(&mut self, other: Self) {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.url.is_some() {
            self.url = other.url;
        }
        if other.phone.is_some() {
            self.phone = other.phone;
        }
        if other.technician.is_some() {
            self.technician = other.technician;
        }
        if other.price_per_call.is_some() {
            self.price_per_call = other.price_per_call;
        }
    }
}

impl Record for Profile {
    type Draft = ProfileDraft;
    const KIND: &'static str = "profile";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: ProfileDraft) -> Self {
        Self {
            id,
            name: draft.name.map(trimmed).unwrap_or_default(),
            url: draft.url.map(trimmed).unwrap_or_default(),
            phone: draft.phone.map(trimmed).unwrap_or_default(),
            technician: draft.technician.map(trimmed).unwrap_or_default(),
            price_per_call: draft.price_per_call.unwrap_or_default(),
        }
    }

    fn merge(&self, draft: ProfileDraft) -> Self {
        Self {
            id: self.id,
            name: draft.name.map(trimmed).unwrap_or_else(|| self.name.clone()),
            url: draft.url.map(trimmed).unwrap_or_else(|| self.url.clone()),
            phone: draft.phone.map(trimmed).unwrap_or_else(|| self.phone.clone()),
            technician: draft.technician.map(trimmed).unwrap_or_else(|| self.technician.clone()),
            price_per_call: draft.price_per_call.unwrap_or(self.price_per_call),
        }
    }

    fn to_draft(&self) -> ProfileDraft {
        ProfileDraft {
            name: Some(self.name.clone()),
            url: Some(self.url.clone()),
            phone: Some(self.phone.clone()),
            technician: Some(self.technician.clone()),
            price_per_call: Some(self.price_per_call),
        }
    }
}

// --- Payload: trocar a localidade ativa ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveLocationPayload {
    pub location_id: RecordId,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveLocationResponse {
    pub active_location: Option<Location>,
}
