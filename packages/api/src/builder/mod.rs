//! Tunnel builder API modules
//!
//! Provides the fluent API for describing a proxy, tuning the negotiation
//! and opening the tunnel.

pub mod auth;
pub mod core;
pub mod methods;

pub use core::*;
