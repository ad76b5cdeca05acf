pub mod health;
pub mod ue_movement;
