//! Domain models for CareLink.
//!
//! These are the core types shared across all crates.

pub mod account;
pub mod connection;
pub mod principal;
pub mod review;
pub mod service;
pub mod service_request;
pub mod session;
