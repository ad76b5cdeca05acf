//! Pure domain services.

pub mod geometry;
pub mod report;
pub mod validity;
