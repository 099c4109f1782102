//! Domain models for the customers API.
//!
//! - [`customer`] - Storage records and the inputs used to create/update them
//! - [`patch`] - Partial-update documents over the patchable customer fields
//! - [`validation`] - Field-level validation errors

pub mod customer;
pub mod patch;
pub mod validation;

pub use customer::{Address, Customer, CustomerFields, NewAddress, NewCustomer};
pub use patch::{PatchDocument, PatchError, PatchField, PatchOperation};
pub use validation::ValidationErrors;
