// src/models/nichos.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::entity_store::{trimmed, Draft, Record, RecordId};

// --- Nicho (Categoria) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: RecordId,
    #[validate(length(min = 1, message = "El nombre del nicho es obligatorio."))]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    #[validate(required(message = "El campo 'name' es obligatorio."))]
    pub name: Option<String>,
}

impl Draft for CategoryDraft {
    fn overlay(&mut self, other: Self) {
        if other.name.is_some() {
            self.name = other.name;
        }
    }
}

impl Record for Category {
    type Draft = CategoryDraft;
    const KIND: &'static str = "category";

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: CategoryDraft) -> Self {
        Self {
            id,
            name: draft.name.map(trimmed).unwrap_or_default(),
        }
    }

    fn merge(&self, draft: CategoryDraft) -> Self {
        Self {
            id: self.id,
            name: draft
                .name
                .map(trimmed)
                .unwrap_or_else(|| self.name.clone()),
        }
    }

    fn to_draft(&self) -> CategoryDraft {
        CategoryDraft { name: Some(self.name.clone()) }
    }
}

/// Referência resolvida para exibição (id + nome atual).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: RecordId,
    pub name: String,
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        Self { id: category.id, name: category.name.clone() }
    }
}
