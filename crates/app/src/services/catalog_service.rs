//! Catalog service: companies, customers, technicians, brands and products.

use techserv_domain::catalog::{Company, Employee, Party, Product, Trademark};
use techserv_domain::error::TechServError;

use crate::ports::CatalogRepository;

/// Application service registering catalog records.
pub struct CatalogService<C> {
    repo: C,
}

impl<C: CatalogRepository> CatalogService<C> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: C) -> Self {
        Self { repo }
    }

    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] for an empty name.
    pub async fn create_company(&self, company: Company) -> Result<Company, TechServError> {
        company.validate()?;
        self.repo.create_company(company).await
    }

    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] for an empty name.
    pub async fn create_party(&self, party: Party) -> Result<Party, TechServError> {
        party.validate()?;
        self.repo.create_party(party).await
    }

    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] for an empty name.
    pub async fn create_employee(&self, employee: Employee) -> Result<Employee, TechServError> {
        employee.validate()?;
        self.repo.create_employee(employee).await
    }

    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] for an empty name.
    pub async fn create_trademark(&self, trademark: Trademark) -> Result<Trademark, TechServError> {
        trademark.validate()?;
        self.repo.create_trademark(trademark).await
    }

    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] for an empty name or a negative
    /// cost price.
    pub async fn create_product(&self, product: Product) -> Result<Product, TechServError> {
        product.validate()?;
        self.repo.create_product(product).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_products(&self) -> Result<Vec<Product>, TechServError> {
        self.repo.get_products().await
    }
}
