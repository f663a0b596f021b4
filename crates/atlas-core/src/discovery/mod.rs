//! Discovery orchestrator sub-modules.
//!
//! - `orchestrator`: the `MetadataDiscovery` read operations and refresh-ahead
//!   protocol
//! - `warmup`: the two-phase bulk pre-caching state machine
//! - `background`: refresh task bodies executed off the read path
//! - `derive`: entity/attribute derivation from introspected tables
//! - `errors`: validation and warm-up error types

pub(crate) mod background;
pub(crate) mod derive;
mod errors;
mod orchestrator;
mod warmup;

pub use errors::{DiscoveryError, ValidationError};
pub use orchestrator::MetadataDiscovery;

#[cfg(test)]
mod tests;
