//! Customer storage.
//!
//! Handlers only see the [`CustomerRepository`] trait. The shipped
//! implementation is [`InMemoryCustomerStore`], a process-lifetime list
//! behind a single lock; nothing is persisted.
//!
//! # Id assignment
//!
//! The store assigns every id while holding its write lock:
//!
//! - customers get `max(customer ids) + 1`, or 1 when the store is empty
//! - addresses get `max(address ids across all customers) + 1`, or 1 when no
//!   address exists, incremented once per address in input order

pub mod customers;
pub mod seed;

use async_trait::async_trait;
use thiserror::Error;
use univali_core::{AddressId, Cpf, CustomerId};

use crate::models::{Customer, CustomerFields, NewAddress, NewCustomer, PatchDocument, PatchError};

pub use customers::InMemoryCustomerStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Requested customer was not found.
    #[error("not found")]
    NotFound,

    /// The next id would overflow `i32`.
    #[error("id space exhausted for {0}")]
    IdExhausted(&'static str),

    /// A patch document could not be applied.
    #[error("patch failed: {0}")]
    Patch(#[from] PatchError),
}

/// Storage operations the request handlers depend on.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// All customers in insertion order.
    async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError>;

    /// First customer with the given id.
    async fn find_customer_by_id(
        &self,
        id: CustomerId,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// First customer with the given national id.
    async fn find_customer_by_national_id(
        &self,
        cpf: &Cpf,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Insert a customer, assigning its id and the ids of its addresses.
    ///
    /// Returns the stored record.
    async fn add_customer(&self, customer: NewCustomer) -> Result<Customer, RepositoryError>;

    /// Remove a customer and every address it owns.
    ///
    /// Returns `RepositoryError::NotFound` if no customer has this id.
    async fn remove_customer(&self, id: CustomerId) -> Result<Customer, RepositoryError>;

    /// Overwrite a customer's name and cpf, keeping its addresses.
    async fn update_customer_fields(
        &self,
        id: CustomerId,
        fields: CustomerFields,
    ) -> Result<Customer, RepositoryError>;

    /// Overwrite a customer's name and cpf and rebuild its address list.
    ///
    /// Every previous address is discarded; each new one gets a fresh id.
    async fn replace_customer(
        &self,
        id: CustomerId,
        fields: CustomerFields,
        addresses: Vec<NewAddress>,
    ) -> Result<Customer, RepositoryError>;

    /// Apply a patch document to a customer's fields.
    ///
    /// The customer is left unchanged unless every operation succeeds and
    /// the result is valid.
    async fn patch_customer(
        &self,
        id: CustomerId,
        patch: &PatchDocument,
    ) -> Result<Customer, RepositoryError>;

    /// Largest address id across every customer.
    async fn max_address_id_global(&self) -> Result<Option<AddressId>, RepositoryError>;
}
