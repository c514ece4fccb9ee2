//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod aggregate;
mod credentials;
mod ledger;
pub mod migration;
mod session;
mod wallet;

pub use aggregate::AggregateService;
pub use credentials::CredentialService;
pub use ledger::LedgerService;
pub use migration::{MigrationResult, MigrationService};
pub use session::SessionService;
pub use wallet::WalletService;
