//! Sample data loaded into the store at startup.
//!
//! Enabled by default; set `UNIVALI_SEED_DATA=false` to start empty.

use thiserror::Error;
use tracing::info;

use super::{CustomerRepository, RepositoryError};
use crate::models::{CustomerFields, NewAddress, NewCustomer, ValidationErrors};

/// `(name, cpf, [(street, city)])`
type SeedCustomer = (&'static str, &'static str, &'static [(&'static str, &'static str)]);

const SEED_CUSTOMERS: &[SeedCustomer] = &[
    (
        "Linus Torvalds",
        "73473943096",
        &[
            ("Rua Uruguai, 458", "Itajai"),
            ("Avenida Brasil, 1200", "Balneario Camboriu"),
        ],
    ),
    (
        "Bill Gates",
        "95395994076",
        &[("Rua XV de Novembro, 50", "Blumenau")],
    ),
    ("Margaret Hamilton", "21883427040", &[]),
];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid seed customer: {0}")]
    Invalid(ValidationErrors),

    #[error("failed to store seed customer: {0}")]
    Repository(#[from] RepositoryError),
}

/// Insert the sample customers through the repository.
///
/// Ids are assigned by the store, so seeding an empty store yields customers
/// 1..=3 and addresses 1..=3.
///
/// # Errors
///
/// Returns `SeedError` if a seed entry is invalid or the store rejects it.
pub async fn seed(repo: &dyn CustomerRepository) -> Result<usize, SeedError> {
    for &(name, cpf, addresses) in SEED_CUSTOMERS {
        let mut errors = ValidationErrors::new();
        let fields = CustomerFields::collect(&mut errors, Some(name), Some(cpf));
        let addresses: Option<Vec<NewAddress>> = addresses
            .iter()
            .enumerate()
            .map(|(i, &(street, city))| NewAddress::collect(&mut errors, i, Some(street), Some(city)))
            .collect();

        let customer = errors
            .into_result(fields.zip(addresses))
            .map(|(fields, addresses)| NewCustomer { fields, addresses })
            .map_err(SeedError::Invalid)?;

        repo.add_customer(customer).await?;
    }

    info!(customers = SEED_CUSTOMERS.len(), "Seed data loaded");
    Ok(SEED_CUSTOMERS.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use univali_core::{AddressId, CustomerId};

    use super::*;
    use crate::db::InMemoryCustomerStore;

    #[tokio::test]
    async fn test_seed_populates_empty_store() {
        let store = InMemoryCustomerStore::new();

        let count = seed(&store).await.unwrap();

        let customers = store.list_customers().await.unwrap();
        assert_eq!(count, 3);
        assert_eq!(customers.len(), 3);
        assert_eq!(customers[0].id, CustomerId::new(1));
        assert_eq!(customers[0].name.as_str(), "Linus Torvalds");
        assert_eq!(customers[2].id, CustomerId::new(3));
        assert!(customers[2].addresses.is_empty());
        assert_eq!(
            store.max_address_id_global().await.unwrap(),
            Some(AddressId::new(3))
        );
    }
}
