//! Domain layer for the NEF mobility emulator.
//!
//! This crate contains:
//! - Domain models (Ue, Cell, Path, Subscription, notification payloads)
//! - Pure services (geometry and signal math, subscription validity,
//!   event report building)

pub mod models;
pub mod services;
