//! Core business logic - framework-agnostic pieces of the broadcast workflow.
//!
//! Everything in here operates on plain data so it can be unit tested without
//! a gateway connection; the `bot` layer maps Discord entities in and out.

/// Delivery accounting and pacing for a broadcast campaign
pub mod campaign;
/// Guild selection data and button identifier scheme
pub mod selection;
