// src/models/call_center.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::validation::validate_percentage,
    db::entity_store::{dedup_ids, trimmed, Draft, Record, RecordId},
    models::nichos::CategoryRef,
};

/// Referência a um perfil GMB: o id do perfil só é único dentro da localidade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRef {
    pub location_id: RecordId,
    pub profile_id: RecordId,
}

// --- Agente de Call Center ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: RecordId,

    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,

    #[validate(length(min = 1, message = "El teléfono es obligatorio."))]
    pub phone: String,

    #[validate(email(message = "El e-mail no es válido."))]
    pub email: String,

    pub nichos: Vec<RecordId>,

    #[validate(custom(function = "validate_percentage"))]
    pub commission: Decimal,

    pub gmb_profiles: Vec<ProfileRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AgentDraft {
    #[validate(required(message = "El campo 'name' es obligatorio."))]
    pub name: Option<String>,

    #[validate(required(message = "El campo 'phone' es obligatorio."))]
    pub phone: Option<String>,

    #[validate(required(message = "El campo 'email' es obligatorio."))]
    pub email: Option<String>,

    pub nichos: Option<Vec<RecordId>>,

    #[validate(required(message = "El campo 'commission' es obligatorio."))]
    pub commission: Option<Decimal>,

    pub gmb_profiles: Option<Vec<ProfileRef>>,
}

impl Draft for AgentDraft {
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
        if other.gmb_profiles.is_some() {
            self.gmb_profiles = other.gmb_profiles;
        }
    }
}

impl Record for Agent {
    type Draft = AgentDraft;
    const KIND: &'static str = "agent";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: AgentDraft) -> Self {
        Self {
            id,
            name: draft.name.map(trimmed).unwrap_or_default(),
            phone: draft.phone.map(trimmed).unwrap_or_default(),
            email: draft.email.map(trimmed).unwrap_or_default(),
            nichos: dedup_ids(draft.nichos.unwrap_or_default()),
            commission: draft.commission.unwrap_or_default(),
            gmb_profiles: dedup_ids(draft.gmb_profiles.unwrap_or_default()),
        }
    }

    fn merge(&self, draft: AgentDraft) -> Self {
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
            gmb_profiles: draft
                .gmb_profiles
                .map(dedup_ids)
                .unwrap_or_else(|| self.gmb_profiles.clone()),
        }
    }

    fn to_draft(&self) -> AgentDraft {
        AgentDraft {
            name: Some(self.name.clone()),
            phone: Some(self.phone.clone()),
            email: Some(self.email.clone()),
            nichos: Some(self.nichos.clone()),
            commission: Some(self.commission),
            gmb_profiles: Some(self.gmb_profiles.clone()),
        }
    }
}

// --- Perfil GMB resolvido para exibição ---
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileLink {
    pub location_id: RecordId,
    pub profile_id: RecordId,
    pub location: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEntry {
    pub id: RecordId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub nichos: Vec<CategoryRef>,
    pub commission: Decimal,
    pub gmb_profiles: Vec<ProfileLink>,
}
