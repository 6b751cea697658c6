// # Address Resolver Trait
//
// Defines the interface for discovering the host's current public address.
//
// ## Implementations
//
// - HTTP discovery endpoint: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::AddressResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* AddressResolver implementation */;
//
//     let address = resolver.resolve().await?;
//     println!("current address: {}", address);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::address::Address;

/// Trait for address resolver implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Behavior
///
/// - Every call performs a live lookup; results are never cached
/// - Every outbound call carries an explicit timeout
/// - A timeout is reported like any other transport failure
///
/// # Forbidden Capabilities
/// - ❌ Access the state store (owned by `ReconciliationLoop`)
/// - ❌ Retry or sleep (owned by `ReconciliationLoop`)
/// - ❌ Decide whether an update is needed
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve the current public address
    ///
    /// # Returns
    ///
    /// - `Ok(Address)`: The current address
    /// - `Err(Error::Resolution)`: Network failure, non-2xx response, or an
    ///   empty/unparseable body
    async fn resolve(&self) -> Result<Address, crate::Error>;

    /// Name of this resolver (for logging)
    fn resolver_name(&self) -> &'static str;
}
