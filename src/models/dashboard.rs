// src/models/dashboard.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{db::entity_store::RecordId, models::nichos::CategoryRef};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Daily,
    Weekly,
    #[default]
    Monthly,
}

// Filtro "all" ou um id concreto (query string: ?nicho=all | ?nicho=3)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Only(RecordId),
}

impl Filter {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("all") => Some(Self::All),
            Some(value) => value.parse().ok().map(Self::Only),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    #[serde(default)]
    pub time_period: TimePeriod,
    pub nicho: Option<String>,
    pub technician: Option<String>,
}

// 1. Os cards do topo
#[derive(Debug, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub categories: usize,
    pub technicians: usize,
    pub agents: usize,
    pub locations: usize,
    pub profiles: usize,
}

// 2. Gráfico (dados simulados)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianOption {
    pub id: RecordId,
    pub name: String,
}

// 3. Opções dos filtros
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilters {
    pub time_period: TimePeriod,
    pub nicho: Option<RecordId>,
    pub technician: Option<RecordId>,
    pub nicho_options: Vec<CategoryRef>,
    pub technician_options: Vec<TechnicianOption>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub summary: DashboardSummary,
    pub chart: ChartData,
    pub filters: DashboardFilters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_parsing() {
        assert_eq!(Filter::parse(None), Some(Filter::All));
        assert_eq!(Filter::parse(Some("all")), Some(Filter::All));
        assert_eq!(Filter::parse(Some("3")), Some(Filter::Only(3)));
        assert_eq!(Filter::parse(Some("hoteles")), None);
    }
}
