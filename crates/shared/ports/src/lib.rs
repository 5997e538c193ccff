//! Conviction Ports
//!
//! Port definitions (traits) for the conviction allocation engine.
//! These define the boundaries between domain logic and infrastructure.

mod clock;
mod error;
mod store;

pub use clock::Clock;
pub use error::{StoreError, StoreResult};
pub use store::LedgerStore;
