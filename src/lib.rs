//! Cloudlab CLI library.
//!
//! Exposes the inventory pipeline and the host verification battery for the
//! two binaries (`cloudlab-inventory`, `cloudlab-verify`) and for
//! integration tests.

#![cfg_attr(test, allow(clippy::expect_used))]

pub mod application;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod output;
