//! Repository implementations.

pub mod cell;
pub mod path;
pub mod subscription;
pub mod ue;

pub use cell::CellRepository;
pub use path::PathRepository;
pub use subscription::SubscriptionRepository;
pub use ue::UeRepository;
