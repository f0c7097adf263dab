//! Rakeback Core - Shared authorization contracts.
//!
//! This crate provides the pieces both authorization gates agree on:
//! - `portal` - Server-side Edge Gate (axum middleware)
//! - browser-side hosts - Client Gate (`ProtectedPage`) and the auth-state provider
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no I/O, no
//! HTTP clients. Route classification and the role decision live here once so
//! the two gates cannot drift apart.
//!
//! # Modules
//!
//! - [`types`] - `Role`, `UserId`, `Email`, `Identity`, `Member`
//! - [`routes`] - Route classification table and the `(path, viewer)` decision
//! - [`auth_state`] - Client-side auth-state provider with a typed lifecycle
//! - [`client_gate`] - Render-boundary gate (`ProtectedPage`)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth_state;
pub mod client_gate;
pub mod routes;
pub mod types;

pub use auth_state::{AuthLifecycle, AuthPersistence, AuthProvider, AuthState, MemoryStorage};
pub use client_gate::{GatePhase, Navigator, ProtectedPage, Rendered};
pub use routes::{Decision, RouteClass, Viewer};
pub use types::*;
