//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressResolver`]: Discover the current public address
//! - [`DnsProvider`]: Perform one provider record-update call
//! - [`RecordUpdater`]: Apply one DNS record update for a target name
//! - [`StateStore`]: Persist the last applied address

pub mod address_resolver;
pub mod dns_provider;
pub mod record_updater;
pub mod state_store;

pub use address_resolver::AddressResolver;
pub use dns_provider::{DnsProvider, ProviderResponse, RecordUpdate};
pub use record_updater::{RecordUpdater, UpdateOutcome, UpdateTarget};
pub use state_store::{StateRecord, StateStore};
