//! In-memory customer repository.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use univali_core::{AddressId, Cpf, CustomerId};

use super::{CustomerRepository, RepositoryError};
use crate::models::{
    Address, Customer, CustomerFields, NewAddress, NewCustomer, PatchDocument,
};

/// Customers held in a `Vec` for the lifetime of the process.
///
/// Reads share the lock. Every mutation holds the write lock across its
/// whole read-modify-write, so id assignment cannot race.
#[derive(Debug, Default)]
pub struct InMemoryCustomerStore {
    customers: RwLock<Vec<Customer>>,
}

impl InMemoryCustomerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `customers` as-is.
    ///
    /// Ids are taken verbatim; callers must keep customer ids and address
    /// ids unique.
    #[must_use]
    pub fn with_customers(customers: Vec<Customer>) -> Self {
        Self {
            customers: RwLock::new(customers),
        }
    }
}

/// Next customer id: current max + 1, or 1 for an empty list.
fn next_customer_id(customers: &[Customer]) -> Result<CustomerId, RepositoryError> {
    match customers.iter().map(|c| c.id).max() {
        Some(max) => max
            .checked_next()
            .ok_or(RepositoryError::IdExhausted("customers")),
        None => Ok(CustomerId::FIRST),
    }
}

fn max_address_id(customers: &[Customer]) -> Option<AddressId> {
    customers.iter().filter_map(Customer::max_address_id).max()
}

/// Give each new address the next global id, in input order.
fn assign_address_ids(
    customers: &[Customer],
    addresses: Vec<NewAddress>,
) -> Result<Vec<Address>, RepositoryError> {
    let mut last = max_address_id(customers);

    addresses
        .into_iter()
        .map(|address| {
            let id = match last {
                Some(prev) => prev
                    .checked_next()
                    .ok_or(RepositoryError::IdExhausted("addresses"))?,
                None => AddressId::FIRST,
            };
            last = Some(id);
            Ok(Address {
                id,
                street: address.street,
                city: address.city,
            })
        })
        .collect()
}

fn position(customers: &[Customer], id: CustomerId) -> Result<usize, RepositoryError> {
    customers
        .iter()
        .position(|c| c.id == id)
        .ok_or(RepositoryError::NotFound)
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerStore {
    async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError> {
        Ok(self.customers.read().await.clone())
    }

    async fn find_customer_by_id(
        &self,
        id: CustomerId,
    ) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.iter().find(|c| c.id == id).cloned())
    }

    async fn find_customer_by_national_id(
        &self,
        cpf: &Cpf,
    ) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.iter().find(|c| &c.cpf == cpf).cloned())
    }

    async fn add_customer(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        let mut customers = self.customers.write().await;

        let id = next_customer_id(&customers)?;
        let addresses = assign_address_ids(&customers, customer.addresses)?;
        let customer = Customer {
            id,
            name: customer.fields.name,
            cpf: customer.fields.cpf,
            addresses,
        };

        customers.push(customer.clone());
        debug!(customer_id = %id, addresses = customer.addresses.len(), "Customer added");
        Ok(customer)
    }

    async fn remove_customer(&self, id: CustomerId) -> Result<Customer, RepositoryError> {
        let mut customers = self.customers.write().await;
        let index = position(&customers, id)?;
        let removed = customers.remove(index);
        debug!(customer_id = %id, "Customer removed");
        Ok(removed)
    }

    async fn update_customer_fields(
        &self,
        id: CustomerId,
        fields: CustomerFields,
    ) -> Result<Customer, RepositoryError> {
        let mut customers = self.customers.write().await;
        let customer = customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;

        customer.apply_fields(fields);
        Ok(customer.clone())
    }

    async fn replace_customer(
        &self,
        id: CustomerId,
        fields: CustomerFields,
        addresses: Vec<NewAddress>,
    ) -> Result<Customer, RepositoryError> {
        let mut customers = self.customers.write().await;
        let index = position(&customers, id)?;

        // Fresh ids continue from the global max, including the addresses
        // being discarded.
        let addresses = assign_address_ids(&customers, addresses)?;

        let customer = customers
            .get_mut(index)
            .ok_or(RepositoryError::NotFound)?;
        customer.apply_fields(fields);
        customer.addresses = addresses;

        debug!(customer_id = %id, addresses = customer.addresses.len(), "Customer replaced");
        Ok(customer.clone())
    }

    async fn patch_customer(
        &self,
        id: CustomerId,
        patch: &PatchDocument,
    ) -> Result<Customer, RepositoryError> {
        let mut customers = self.customers.write().await;
        let customer = customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;

        let patched = patch.apply_to(&customer.fields())?;
        customer.apply_fields(patched);
        Ok(customer.clone())
    }

    async fn max_address_id_global(&self) -> Result<Option<AddressId>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(max_address_id(&customers))
    }
}
