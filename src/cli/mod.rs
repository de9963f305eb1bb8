//! CLI argument parsing with clap derive, one module per binary.

pub mod inventory;
pub mod verify;
