//! User Service Library
//!
//! Calls a group of stored user routines in a PostgreSQL database through
//! named bindings, and provisions that group for the duration of a run.

pub mod config;
pub mod executor;
pub mod infra;
pub mod lifecycle;
pub mod repository;
pub mod scenario;

use std::sync::Arc;

use tracing::{info, warn};

use common::{AppResult, ConnectionMode, StoreConfig};

use crate::executor::{CallExecutor, ScriptExecutor};
use crate::infra::{ConnectionProvider, DirectConnector, PooledConnector};
use crate::lifecycle::RoutineLifecycle;
use crate::repository::{UserRepository, UserStore};
use crate::scenario::{ScenarioReport, UserScenario};

/// Users created by the listing check of a scenario run.
pub const LISTING_NAMES: &[&str] = &["Alice", "Bob"];

/// Repository and routine lifecycle sharing one connection provider.
pub struct UserApp {
    pub users: Arc<dyn UserRepository>,
    pub lifecycle: RoutineLifecycle,
    provider: Arc<dyn ConnectionProvider>,
    pool: Option<Arc<PooledConnector>>,
}

impl UserApp {
    /// Connect according to `config` and wire every component.
    pub async fn build(config: StoreConfig) -> AppResult<Self> {
        info!(
            principal = %config.principal,
            endpoint = %config.connect_string,
            tls = config.trust_store.is_some(),
            mode = ?config.mode,
            "Connecting to store"
        );
        let group = config.routine_group.clone();
        let module = config.routine_module.clone();

        match config.mode {
            ConnectionMode::PerCall => {
                tracing::debug!("Using a new connection per call");
                let direct = Arc::new(DirectConnector::new(Arc::new(config)));
                Self::with_provider(direct, &group, &module)
            }
            ConnectionMode::Pooled { max_connections } => {
                let pooled = PooledConnector::connect(&config, max_connections).await?;
                Self::pooled(pooled, &group, &module)
            }
        }
    }

    /// Wire every component over an existing provider.
    pub fn with_provider(
        provider: Arc<dyn ConnectionProvider>,
        group: &str,
        module: &str,
    ) -> AppResult<Self> {
        let users = UserStore::new(CallExecutor::new(provider.clone()), group)?;
        let lifecycle =
            RoutineLifecycle::new(ScriptExecutor::new(provider.clone()), group, module)?;
        Ok(Self {
            users: Arc::new(users),
            lifecycle,
            provider,
            pool: None,
        })
    }

    /// Wire every component over a pool that [`UserApp::shutdown`] closes.
    pub fn pooled(pool: PooledConnector, group: &str, module: &str) -> AppResult<Self> {
        let pool = Arc::new(pool);
        let mut app = Self::with_provider(pool.clone(), group, module)?;
        app.pool = Some(pool);
        Ok(app)
    }

    /// Provider shared by every component.
    pub fn provider(&self) -> Arc<dyn ConnectionProvider> {
        self.provider.clone()
    }

    /// Drop every component and close the pool, if one was built.
    pub async fn shutdown(self) -> AppResult<()> {
        let Self {
            users,
            lifecycle,
            provider,
            pool,
        } = self;
        drop((users, lifecycle, provider));

        match pool {
            Some(pool) => match Arc::try_unwrap(pool) {
                Ok(pool) => pool.close().await,
                Err(_) => {
                    warn!("Connection pool still shared at shutdown; leaving it to drop");
                    Ok(())
                }
            },
            None => Ok(()),
        }
    }

    /// Provision the routine group, run the scenario, and drop the group.
    ///
    /// Teardown runs even when the scenario fails; the scenario's error wins.
    pub async fn run_scenario(&self, name: &str, renamed: &str) -> AppResult<ScenarioReport> {
        self.lifecycle.setup().await?;

        let outcome = self.scenario_steps(name, renamed).await;

        if let Err(e) = self.lifecycle.teardown().await {
            if outcome.is_ok() {
                return Err(e);
            }
            warn!(error = %e, "Teardown after a failed scenario also failed");
        }

        outcome
    }

    async fn scenario_steps(&self, name: &str, renamed: &str) -> AppResult<ScenarioReport> {
        let scenario = UserScenario::new(self.users.clone());
        let mut report = scenario.run(name, renamed).await?;
        let listing = scenario.check_listing(LISTING_NAMES).await?;
        report.steps.extend(listing.steps);
        Ok(report)
    }
}
