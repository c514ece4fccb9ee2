//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the WalletStore port
//! - In-memory store for service unit tests

pub mod duckdb;
pub mod memory;

pub use duckdb::DuckDbStore;
pub use memory::MemoryStore;
