//! Core type definitions used across the VoxRelay workspace.

pub mod device;
pub mod id;

pub use device::DeviceKey;
pub use id::ConnectionId;
