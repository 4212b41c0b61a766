// src/config.rs

use std::{env, path::PathBuf, sync::Arc};

use anyhow::{bail, Context};
use axum::extract::FromRef;

use crate::{
    common::i18n::I18nStore,
    db::Stores,
    models::auth::Role,
    services::{
        call_center_service::{AgentLinks, AgentService},
        dashboard_service::DashboardService,
        identity::{IdentityProvider, LocalIdentityProvider, LocalProviderSettings},
        nichos_service::{CategoryLinks, CategoryService},
        page::CrudService,
        perfiles_service::{ListingService, LocationsPage, ProfilesPage},
        session::SessionStore,
        tecnicos_service::{TechnicianLinks, TechnicianService},
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_TTL_HOURS: i64 = 168;

/// Conta semeada no provedor de identidade na inicialização.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub session_file: Option<PathBuf>,
    pub bcrypt_cost: u32,
    pub admin: Option<AdminAccount>,
    pub seed_demo_data: bool,
    pub default_locale: String,
}

impl Config {
    /// Lê o `.env` (se existir) e as variáveis de ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let session_ttl_hours = match var("SESSION_TTL_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("SESSION_TTL_HOURS inválido: {raw}"))?,
            None => DEFAULT_SESSION_TTL_HOURS,
        };
        if session_ttl_hours <= 0 {
            bail!("SESSION_TTL_HOURS deve ser positivo");
        }

        let bcrypt_cost = match var("BCRYPT_COST") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("BCRYPT_COST inválido: {raw}"))?,
            None => bcrypt::DEFAULT_COST,
        };

        let admin = match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => {
                let raw_role = var("ADMIN_ROLE").unwrap_or_else(|| "admin".to_string());
                let role = Role::from_provider(&raw_role)
                    .with_context(|| format!("ADMIN_ROLE desconhecido: {raw_role}"))?;
                Some(AdminAccount { email, password, role })
            }
            (None, None) => None,
            _ => bail!("ADMIN_EMAIL e ADMIN_PASSWORD devem ser definidos juntos"),
        };

        let seed_demo_data = match var("SEED_DEMO_DATA") {
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .with_context(|| format!("SEED_DEMO_DATA inválido: {raw}"))?,
            None => true,
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            jwt_secret,
            session_ttl_hours,
            session_file: var("SESSION_FILE").map(PathBuf::from),
            bcrypt_cost,
            admin,
            seed_demo_data,
            default_locale: var("DEFAULT_LOCALE").unwrap_or_else(|| "es".to_string()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub i18n_store: I18nStore,
    pub stores: Stores,
    pub identity: Arc<dyn IdentityProvider>,
    pub session: SessionStore,
    // Serviços das páginas
    pub category_service: CategoryService,
    pub technician_service: TechnicianService,
    pub agent_service: AgentService,
    pub listing_service: ListingService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let provider = LocalIdentityProvider::new(LocalProviderSettings {
            jwt_secret: config.jwt_secret.clone(),
            session_ttl: chrono::Duration::hours(config.session_ttl_hours),
            hash_cost: config.bcrypt_cost,
            session_file: config.session_file.clone(),
        });

        if let Some(admin) = &config.admin {
            provider
                .set_password(&admin.email, &admin.password, admin.role)
                .await
                .context("Falha ao criar a conta inicial")?;
        }

        let stores = if config.seed_demo_data {
            tracing::info!("🌱 Carregando os dados de exemplo");
            Stores::demo()
        } else {
            Stores::default()
        };

        Self::from_parts(config, Arc::new(provider), stores)
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        stores: Stores,
    ) -> anyhow::Result<Self> {
        let technician_service = CrudService::new(
            stores.technicians.clone(),
            TechnicianLinks { categories: stores.categories.clone() },
        );
        let agent_service = CrudService::new(
            stores.agents.clone(),
            AgentLinks {
                categories: stores.categories.clone(),
                listings: stores.listings.clone(),
            },
        );
        // Nichos e localidades limpam as referências (e os rascunhos) destas páginas.
        let category_service = CrudService::new(
            stores.categories.clone(),
            CategoryLinks {
                technicians: technician_service.clone(),
                agents: agent_service.clone(),
            },
        );
        let listing_service = ListingService::new(stores.listings.clone(), agent_service.clone())?;
        let dashboard_service = DashboardService::new(
            stores.categories.clone(),
            stores.technicians.clone(),
            stores.agents.clone(),
            stores.listings.clone(),
        );

        Ok(Self {
            i18n_store: I18nStore::new(&config.default_locale),
            config: Arc::new(config),
            session: SessionStore::new(identity.clone()),
            identity,
            stores,
            category_service,
            technician_service,
            agent_service,
            listing_service,
            dashboard_service,
        })
    }
}

// ---
// Subestados para os extratores (`State<T>` e os handlers genéricos)
// ---
impl FromRef<AppState> for SessionStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.session.clone()
    }
}

impl FromRef<AppState> for CategoryService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.category_service.clone()
    }
}

impl FromRef<AppState> for TechnicianService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.technician_service.clone()
    }
}

impl FromRef<AppState> for AgentService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.agent_service.clone()
    }
}

impl FromRef<AppState> for LocationsPage {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.listing_service.locations()
    }
}

impl FromRef<AppState> for ProfilesPage {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.listing_service.profiles()
    }
}
