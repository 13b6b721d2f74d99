//! # API Shared
//!
//! Shared definitions for the Liaison MDX surfaces.
//!
//! Contains:
//! - Request/response wire types (`messages` module)
//! - Shared services like `HealthService`
//!
//! Used by `mdx-core`, `api-rest` and the `mdx` CLI so every surface speaks the same JSON.

pub mod health;
pub mod messages;

pub use health::HealthService;
pub use messages::*;
