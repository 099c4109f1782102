//! Customer and address storage records.

use univali_core::{AddressId, City, Cpf, CustomerId, CustomerName, Street};

use super::validation::ValidationErrors;

/// A stored customer with the addresses it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: CustomerName,
    pub cpf: Cpf,
    pub addresses: Vec<Address>,
}

/// A stored address. Ids are unique across every customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub id: AddressId,
    pub street: Street,
    pub city: City,
}

/// The scalar fields of a customer that updates and patches overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerFields {
    pub name: CustomerName,
    pub cpf: Cpf,
}

/// A customer to insert; the store assigns every id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub fields: CustomerFields,
    pub addresses: Vec<NewAddress>,
}

/// An address to insert; the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub street: Street,
    pub city: City,
}

impl Customer {
    /// The customer's current scalar fields.
    #[must_use]
    pub fn fields(&self) -> CustomerFields {
        CustomerFields {
            name: self.name.clone(),
            cpf: self.cpf.clone(),
        }
    }

    /// Overwrite the scalar fields in place.
    pub fn apply_fields(&mut self, fields: CustomerFields) {
        self.name = fields.name;
        self.cpf = fields.cpf;
    }

    /// Largest address id owned by this customer.
    #[must_use]
    pub fn max_address_id(&self) -> Option<AddressId> {
        self.addresses.iter().map(|a| a.id).max()
    }
}

impl CustomerFields {
    /// Validate raw `name` and `cpf` values.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(name: Option<&str>, cpf: Option<&str>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let fields = Self::collect(&mut errors, name, cpf);
        errors.into_result(fields)
    }

    /// Validate into a shared error set, so callers can add more fields.
    pub fn collect(
        errors: &mut ValidationErrors,
        name: Option<&str>,
        cpf: Option<&str>,
    ) -> Option<Self> {
        let name = errors.text("name", name, CustomerName::parse);
        let cpf = errors.cpf("cpf", cpf);
        Some(Self {
            name: name?,
            cpf: cpf?,
        })
    }
}

impl NewAddress {
    /// Validate one element of an `addresses` array at position `index`.
    pub fn collect(
        errors: &mut ValidationErrors,
        index: usize,
        street: Option<&str>,
        city: Option<&str>,
    ) -> Option<Self> {
        let street = errors.text(&format!("addresses[{index}].street"), street, Street::parse);
        let city = errors.text(&format!("addresses[{index}].city"), city, City::parse);
        Some(Self {
            street: street?,
            city: city?,
        })
    }
}
