//! Univali customers API library.
//!
//! This crate provides the HTTP service as a library, allowing it to be
//! tested end-to-end and reused by the binary.
//!
//! # Architecture
//!
//! - Axum handlers in [`routes`] validate input and convert records to wire shapes
//! - [`db::CustomerRepository`] is the only storage seam; [`db::InMemoryCustomerStore`]
//!   backs it with a lock-guarded list
//! - [`error::AppError`] turns every failure into a problem-details response

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod routes;
pub mod state;
