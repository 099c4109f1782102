//! Univali Core - Shared types library.
//!
//! This crate provides the domain types used by the customers API:
//! - `api` - HTTP service, repository, and request handlers
//! - `integration-tests` - End-to-end tests against a running router
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and validated customer fields

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
