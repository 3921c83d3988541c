//! Web admin console for frp tunnel definitions.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                  FRPC CONSOLE                     │
//!                 │                                                   │
//!   HTTP request  │  ┌─────────┐    ┌──────────┐    ┌─────────────┐  │
//!   ──────────────┼─▶│   api   │───▶│ registry │───▶│    store    │──┼──▶ frpc.toml
//!                 │  │ session │    │ reserved │    │ read/write  │  │    (+ rotated
//!                 │  │ + rate  │    │ key CRUD │    │ + backups   │  │     backups)
//!                 │  │  limit  │    └──────────┘    └─────────────┘  │
//!                 │  └────┬────┘                                     │
//!                 │       │         ┌──────────┐                     │
//!                 │       └────────▶│ service  │─────────────────────┼──▶ systemctl
//!                 │                 │ control  │                     │
//!                 │                 └──────────┘                     │
//!                 │  ┌────────────────────────────────────────────┐  │
//!                 │  │ config: settings loaded once at startup     │  │
//!                 │  └────────────────────────────────────────────┘  │
//!                 └──────────────────────────────────────────────────┘
//! ```
//!
//! Every request that touches the tunnel config reads it fresh from disk,
//! mutates it in memory, and rewrites it whole; nothing is cached between
//! requests.

pub mod api;
pub mod auth;
pub mod config;
pub mod registry;
pub mod service;
pub mod store;

pub use api::{build_router, serve, AppState};
pub use config::{load_settings, Settings};
pub use registry::ProxyRegistry;
pub use service::ServiceControl;
pub use store::ConfigStore;
