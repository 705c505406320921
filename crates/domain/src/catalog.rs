//! Catalog records referenced by services: companies, customers,
//! technicians, trademarks and products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{TechServError, ValidationError};
use crate::id::{CompanyId, EmployeeId, PartyId, ProductId, TrademarkId};

macro_rules! define_named_record {
    ($(#[doc = $doc:expr])* $name:ident, $id:ty) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            pub id: $id,
            pub name: String,
        }

        impl $name {
            /// Create a record with a fresh id.
            ///
            /// # Errors
            ///
            /// Returns [`TechServError::Validation`] when `name` is empty.
            pub fn new(name: impl Into<String>) -> Result<Self, TechServError> {
                let record = Self {
                    id: <$id>::new(),
                    name: name.into(),
                };
                record.validate()?;
                Ok(record)
            }

            /// Check domain invariants.
            ///
            /// # Errors
            ///
            /// Returns [`TechServError::Validation`] when `name` is empty.
            pub fn validate(&self) -> Result<(), TechServError> {
                if self.name.trim().is_empty() {
                    return Err(ValidationError::EmptyName.into());
                }
                Ok(())
            }
        }
    };
}

define_named_record!(
    /// The workshop operating services and owning fiscal years.
    Company,
    CompanyId
);

define_named_record!(
    /// A customer bringing devices in.
    Party,
    PartyId
);

define_named_record!(
    /// A technician assigned to services or lines.
    Employee,
    EmployeeId
);

define_named_record!(
    /// A device brand.
    Trademark,
    TrademarkId
);

/// A type of work or part, priced at cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub cost_price: Decimal,
}

impl Product {
    /// Create a builder for constructing a [`Product`].
    #[must_use]
    pub fn builder() -> ProductBuilder {
        ProductBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] when `name` is empty or the cost
    /// price is negative.
    pub fn validate(&self) -> Result<(), TechServError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.cost_price.is_sign_negative() {
            return Err(ValidationError::NegativeAmount.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Product`].
#[derive(Debug, Default)]
pub struct ProductBuilder {
    id: Option<ProductId>,
    name: Option<String>,
    cost_price: Option<Decimal>,
}

impl ProductBuilder {
    #[must_use]
    pub fn id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn cost_price(mut self, cost_price: Decimal) -> Self {
        self.cost_price = Some(cost_price);
        self
    }

    /// Consume the builder, validate, and return a [`Product`].
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] if `name` is missing or the
    /// price is negative.
    pub fn build(self) -> Result<Product, TechServError> {
        let product = Product {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            cost_price: self.cost_price.unwrap_or_default(),
        };
        product.validate()?;
        Ok(product)
    }
}
