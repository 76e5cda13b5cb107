//! # voxrelay-realtime
//!
//! Real-time relay engine for VoxRelay. Provides:
//!
//! - Typed connection handles with bounded, non-blocking outbound queues
//! - Shared-secret authentication for device and listener connections
//! - A registry holding one producer and any number of listeners per device
//! - Validation and fan-out of fixed-size PCM audio frames
//! - A control bridge that pushes admin commands to a device's producer
//! - A liveness supervisor that pings every open connection

pub mod connection;
pub mod control;
pub mod message;
pub mod metrics;
pub mod registry;
pub mod routing;
pub mod server;

pub use connection::authenticator::TokenAuthenticator;
pub use connection::handle::{ConnectionHandle, Role};
pub use connection::manager::ConnectionManager;
pub use control::bridge::ControlBridge;
pub use registry::RelayRegistry;
pub use routing::router::FrameRouter;
pub use server::RelayEngine;
