//! MyWallet Core - Business logic for the MyWallet personal finance backend
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (User, Session, LedgerEntry, etc.)
//! - **ports**: Trait definitions for external dependencies (WalletStore)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;

use adapters::duckdb::DuckDbStore;
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{
    BalanceAggregate, BalancePatch, EntryKind, LedgerEntry, Session, User, UserProfile,
    WalletSnapshot,
};
pub use ports::WalletStore;

/// Main context for MyWallet operations
///
/// This is the primary entry point for all business logic. It holds
/// the database connection, configuration, and all services.
pub struct WalletContext {
    pub config: Config,
    pub store: Arc<DuckDbStore>,
    pub credential_service: CredentialService,
    pub session_service: SessionService,
    pub ledger_service: LedgerService,
    pub aggregate_service: AggregateService,
    pub wallet_service: WalletService,
}

impl WalletContext {
    /// Create a new MyWallet context rooted at the given data directory
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;

        let db_path = data_dir.join("mywallet.duckdb");
        let store = Arc::new(DuckDbStore::new(&db_path)?);

        // Initialize schema
        store.ensure_schema()?;

        let shared: Arc<dyn WalletStore> = store.clone();
        let ttl = Duration::minutes(config.session_ttl_minutes);

        let credential_service = CredentialService::new(Arc::clone(&shared));
        let session_service = SessionService::new(Arc::clone(&shared), ttl);
        let ledger_service = LedgerService::new(Arc::clone(&shared));
        let aggregate_service = AggregateService::new(Arc::clone(&shared));
        let wallet_service = WalletService::new(shared);

        Ok(Self {
            config,
            store,
            credential_service,
            session_service,
            ledger_service,
            aggregate_service,
            wallet_service,
        })
    }

    /// Resolve a bearer token and return the composed wallet snapshot for
    /// its user. The usual read path for an authenticated client.
    pub fn wallet_for_token(&self, token: &str) -> domain::result::Result<WalletSnapshot> {
        let user = self.session_service.resolve(token)?;
        self.wallet_service.compose(user.id)
    }
}
