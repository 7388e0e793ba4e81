//! Authentication exchanges against the auth endpoint.
//!
//! One exchange per [`crate::models::auth::AuthVersion`] variant, dispatched
//! exhaustively by [`negotiator::authenticate`]. Each variant owns its request
//! shape and response parsing; failures bubble to the caller without retry.

mod negotiator;
mod v1;
mod v2;

pub use negotiator::authenticate;
