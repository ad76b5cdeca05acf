//! Shared utilities and common types for the NEF emulator.
//!
//! This crate provides common functionality used across all other crates:
//! - Coordinate and radius validation
//! - Timestamp parsing helpers

pub mod time;
pub mod validation;
