//! Core types and utilities shared by the report-portal crates.
//!
//! This crate provides the `Result` alias used for layered error reporting
//! and the opaque random tokens that back session identifiers.

pub mod error;
pub mod token;

pub use error::Result;
pub use token::{RandomnessUnavailable, random_token};
