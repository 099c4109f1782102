//! Core types for the customers API.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cpf;
pub mod id;
pub mod text;

pub use cpf::{Cpf, CpfError};
pub use id::*;
pub use text::{City, CustomerName, Street, TextError};
