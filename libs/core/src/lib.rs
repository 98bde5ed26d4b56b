//! Core contracts for the wa-relay service.
//!
//! Holds the destination normalizer, the [`SessionClient`] trait the HTTP layer
//! talks to, the session event model pushed by the automation bridge, and the
//! inbound command rule.
pub mod command;
pub mod destination;
pub mod memory;
pub mod session;

pub use command::*;
pub use destination::*;
pub use memory::*;
pub use session::*;
