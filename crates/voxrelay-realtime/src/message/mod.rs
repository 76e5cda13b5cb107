//! Wire message definitions: audio frames, control commands, device reports.

pub mod frame;
pub mod types;

pub use frame::AudioFrame;
pub use types::{ControlCommand, DeviceMessage, InboundMessage};
