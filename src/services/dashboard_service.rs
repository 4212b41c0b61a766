// src/services/dashboard_service.rs

use crate::{
    common::{error::AppError, validation::field_error},
    db::{
        entity_store::{EntityStore, Record, RecordId},
        partitioned_store::ListingStore,
        shared::Shared,
    },
    models::{
        call_center::Agent,
        dashboard::{
            ChartData, ChartDataset, DashboardFilters, DashboardQuery, DashboardResponse,
            DashboardSummary, Filter, TechnicianOption,
        },
        nichos::{Category, CategoryRef},
        tecnicos::Technician,
    },
};

// Série de exemplo: o painel ainda não calcula métricas.
const CHART_TITLE: &str = "Tickets Resolved Over Time";
const CHART_LABELS: [&str; 7] = ["January", "February", "March", "April", "May", "June", "July"];
const TICKETS_RESOLVED: [u32; 7] = [65, 59, 80, 81, 56, 55, 40];

#[derive(Clone)]
pub struct DashboardService {
    categories: Shared<EntityStore<Category>>,
    technicians: Shared<EntityStore<Technician>>,
    agents: Shared<EntityStore<Agent>>,
    listings: Shared<ListingStore>,
}

impl DashboardService {
    pub fn new(
        categories: Shared<EntityStore<Category>>,
        technicians: Shared<EntityStore<Technician>>,
        agents: Shared<EntityStore<Agent>>,
        listings: Shared<ListingStore>,
    ) -> Self {
        Self { categories, technicians, agents, listings }
    }

    pub fn get_dashboard(&self, query: DashboardQuery) -> Result<DashboardResponse, AppError> {
        // Locks na ordem: categorias < localidades < técnicos < agentes.
        let categories = self.categories.read()?;
        let listings = self.listings.read()?;
        let technicians = self.technicians.read()?;
        let agents = self.agents.read()?;

        let nicho = selected("nicho", query.nicho.as_deref(), &categories)?;
        let technician = selected("technician", query.technician.as_deref(), &technicians)?;

        let summary = DashboardSummary {
            categories: categories.len(),
            technicians: technicians.len(),
            agents: agents.len(),
            locations: listings.locations().len(),
            profiles: listings.child_count(),
        };

        let chart = ChartData {
            title: CHART_TITLE.to_string(),
            labels: CHART_LABELS.iter().map(|l| l.to_string()).collect(),
            datasets: vec![ChartDataset {
                label: "Tickets Resolved".to_string(),
                data: TICKETS_RESOLVED.to_vec(),
            }],
        };

        let filters = DashboardFilters {
            time_period: query.time_period,
            nicho,
            technician,
            nicho_options: categories.list().iter().map(CategoryRef::from).collect(),
            technician_options: technicians
                .list()
                .iter()
                .map(|t| TechnicianOption { id: t.id, name: t.name.clone() })
                .collect(),
        };

        Ok(DashboardResponse { summary, chart, filters })
    }
}

/// "all" (ou ausente) vira `None`; um id precisa existir na store.
fn selected<T: Record>(
    field: &'static str,
    raw: Option<&str>,
    store: &EntityStore<T>,
) -> Result<Option<RecordId>, AppError> {
    match Filter::parse(raw) {
        Some(Filter::All) => Ok(None),
        Some(Filter::Only(id)) if store.contains(id) => Ok(Some(id)),
        Some(Filter::Only(id)) => Err(AppError::NotFound { resource: T::KIND, id }),
        None => Err(field_error(
            field,
            "invalid_filter",
            format!("Use 'all' o un id numérico, no '{}'.", raw.unwrap_or_default()),
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::seed, models::dashboard::TimePeriod};

    fn service() -> DashboardService {
        DashboardService::new(
            Shared::new(EntityStore::with_records(seed::categories())),
            Shared::new(EntityStore::with_records(seed::technicians())),
            Shared::new(EntityStore::with_records(seed::agents())),
            Shared::new(ListingStore::with_records(seed::locations(), seed::profiles())),
        )
    }

    #[test]
    fn default_query_returns_the_sample_series_and_counts() {
        let response = service().get_dashboard(DashboardQuery::default()).unwrap();

        assert_eq!(
            response.summary,
            DashboardSummary { categories: 7, technicians: 1, agents: 1, locations: 3, profiles: 3 }
        );
        assert_eq!(response.chart.labels.len(), 7);
        assert_eq!(response.chart.datasets[0].data, vec![65, 59, 80, 81, 56, 55, 40]);
        assert_eq!(response.filters.time_period, TimePeriod::Monthly);
        assert_eq!(response.filters.nicho_options.len(), 7);
        assert!(response.filters.nicho.is_none());
    }

    #[test]
    fn filters_are_echoed_when_they_exist() {
        let query = DashboardQuery {
            time_period: TimePeriod::Weekly,
            nicho: Some("2".into()),
            technician: Some("1".into()),
        };
        let response = service().get_dashboard(query).unwrap();
        assert_eq!(response.filters.nicho, Some(2));
        assert_eq!(response.filters.technician, Some(1));
    }

    #[test]
    fn unknown_or_malformed_filters_fail() {
        let unknown = DashboardQuery { technician: Some("8".into()), ..Default::default() };
        assert!(matches!(
            service().get_dashboard(unknown),
            Err(AppError::NotFound { resource: "technician", id: 8 })
        ));

        let malformed = DashboardQuery { nicho: Some("hotels".into()), ..Default::default() };
        assert!(matches!(service().get_dashboard(malformed), Err(AppError::ValidationError(_))));
    }
}
