//! Infrastructure adapters: real processes and the real filesystem.

pub mod command_runner;
pub mod inspector;
pub mod terraform;
