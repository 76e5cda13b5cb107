//! Connection management: handles, pool, authentication, lifecycle, liveness.

pub mod authenticator;
pub mod handle;
pub mod heartbeat;
pub mod manager;
pub mod pool;

pub use handle::{ConnectionHandle, Role};
pub use manager::ConnectionManager;
