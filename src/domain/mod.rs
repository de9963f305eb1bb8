//! Core domain types.
//!
//! Pure data and rules: the inventory document, parsed Terraform outputs,
//! the error taxonomy, and the check model for host verification. Nothing
//! here performs I/O.

pub mod checks;
pub mod error;
pub mod inventory;
pub mod outputs;
