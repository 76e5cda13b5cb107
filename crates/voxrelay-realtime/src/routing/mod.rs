//! Inbound message classification and frame fan-out.

pub mod router;

pub use router::{FanOut, FrameRouter, RouteOutcome};
