//! NEF mobility emulator service.
//!
//! Wires the mobility engine, notification dispatcher and in-memory
//! repositories behind a thin axum API.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
