//! Application state wiring all services together.
//!
//! Services in `codipop-core` are generic over their ports; AppState pins them
//! to the concrete infra implementations.

use std::sync::Arc;

use codipop_core::clock::SystemClock;
use codipop_core::fitting::orchestrator::FittingOrchestrator;
use codipop_core::history::service::HistoryService;
use codipop_core::onboarding::OnboardingFlag;
use codipop_core::quota::QuotaStore;
use codipop_core::wardrobe::WardrobeService;
use codipop_infra::config::load_app_config;
use codipop_infra::filesystem::blob::LocalBlobStore;
use codipop_infra::filesystem::resolve_data_dir;
use codipop_infra::http::compositor::HttpCompositor;
use codipop_infra::sqlite::fitting_result::SqliteFittingResultRepository;
use codipop_infra::sqlite::kv::SqliteKvStore;
use codipop_infra::sqlite::pool::{DatabasePool, database_url};
use codipop_infra::sqlite::wardrobe::SqliteWardrobeRepository;
use codipop_types::config::AppConfig;
use codipop_types::session::UserSession;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteOrchestrator = FittingOrchestrator<
    HttpCompositor,
    SqliteKvStore,
    SqliteFittingResultRepository,
    SqliteWardrobeRepository,
    SystemClock,
>;

pub type ConcreteWardrobeService = WardrobeService<SqliteWardrobeRepository, LocalBlobStore>;

pub type ConcreteHistoryService = HistoryService<SqliteFittingResultRepository>;

/// Shared application state for CLI commands.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConcreteOrchestrator>,
    pub wardrobe_service: Arc<ConcreteWardrobeService>,
    pub history_service: Arc<ConcreteHistoryService>,
    pub onboarding: Arc<OnboardingFlag<SqliteKvStore>>,
    pub session: UserSession,
    pub config: AppConfig,
}

impl AppState {
    /// Connect to the database, load config, and wire services for `user_id`.
    pub async fn init(user_id: &str) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_app_config(&data_dir).await;
        tracing::debug!(?config, data_dir = %data_dir.display(), "loaded configuration");

        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        let kv_store = SqliteKvStore::new(db_pool.clone());
        let history_repo = SqliteFittingResultRepository::new(db_pool.clone());
        let wardrobe_repo = SqliteWardrobeRepository::new(db_pool.clone());
        let session = UserSession::new(user_id);

        let orchestrator = FittingOrchestrator::new(
            HttpCompositor::from_config(&config)?,
            QuotaStore::new(kv_store.clone(), SystemClock, config.daily_limit),
            history_repo.clone(),
            wardrobe_repo.clone(),
            session.clone(),
            config.max_selection,
            config.request_timeout(),
        );

        let wardrobe_service = WardrobeService::new(wardrobe_repo, LocalBlobStore::new(&data_dir));
        let history_service = HistoryService::new(history_repo);
        let onboarding = OnboardingFlag::new(kv_store);

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            wardrobe_service: Arc::new(wardrobe_service),
            history_service: Arc::new(history_service),
            onboarding: Arc::new(onboarding),
            session,
            config,
        })
    }
}
