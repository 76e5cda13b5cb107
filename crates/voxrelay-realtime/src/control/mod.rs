//! Out-of-band administrative commands delivered over the data channel.

pub mod bridge;

pub use bridge::ControlBridge;
