//! Application services (use-cases).

pub mod inventory;
pub mod verify;
