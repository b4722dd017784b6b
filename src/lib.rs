//! `DMCast` - a Discord broadcast bot
//!
//! This crate lets a guild administrator broadcast a direct message to all
//! human members of one chosen server, selected through a button-based panel,
//! with a confirmation step and a final delivery report.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    unsafe_code,
    unsafe_op_in_unsafe_fn,
    unreachable_code,
    unreachable_patterns,
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::dbg_macro,
    clippy::float_cmp,
    clippy::todo,
    clippy::unimplemented,
    clippy::large_enum_variant,
    clippy::match_same_arms,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,       // Will add gradually
)]

/// Discord bot interface - commands, interactive flows, and bot context
pub mod bot;
/// Configuration loading and token resolution
pub mod config;
/// Core business logic - framework-agnostic selection and delivery accounting
pub mod core;
/// Unified error types and result handling
pub mod errors;
