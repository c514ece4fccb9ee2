//! Port definitions - trait abstractions for external dependencies

pub mod store;

pub use store::WalletStore;
