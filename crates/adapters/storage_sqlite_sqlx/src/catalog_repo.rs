//! `SQLite` implementation of [`CatalogRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use techserv_app::ports::CatalogRepository;
use techserv_domain::catalog::{Company, Employee, Party, Product, Trademark};
use techserv_domain::error::TechServError;
use techserv_domain::id::ProductId;

use crate::decode::parse;
use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Product`].
struct Wrapper(Product);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let cost_price: String = row.try_get("cost_price")?;

        Ok(Self(Product {
            id: parse(&id)?,
            name: row.try_get("name")?,
            cost_price: parse(&cost_price)?,
        }))
    }
}

const INSERT_COMPANY: &str = "INSERT INTO companies (id, name) VALUES (?, ?)";
const INSERT_PARTY: &str = "INSERT INTO parties (id, name) VALUES (?, ?)";
const INSERT_EMPLOYEE: &str = "INSERT INTO employees (id, name) VALUES (?, ?)";
const INSERT_TRADEMARK: &str = "INSERT INTO trademarks (id, name) VALUES (?, ?)";
const INSERT_PRODUCT: &str = "INSERT INTO products (id, name, cost_price) VALUES (?, ?, ?)";
const SELECT_PRODUCT_BY_ID: &str = "SELECT * FROM products WHERE id = ?";
const SELECT_ALL_PRODUCTS: &str = "SELECT * FROM products ORDER BY name";

/// `SQLite`-backed catalog of companies, customers, technicians, trademarks
/// and products.
#[derive(Clone)]
pub struct SqliteCatalogRepository {
    pool: SqlitePool,
}

impl SqliteCatalogRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert_named(&self, statement: &str, id: String, name: &str) -> Result<(), StorageError> {
        sqlx::query(statement)
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

impl CatalogRepository for SqliteCatalogRepository {
    async fn create_company(&self, company: Company) -> Result<Company, TechServError> {
        self.insert_named(INSERT_COMPANY, company.id.to_string(), &company.name)
            .await?;
        Ok(company)
    }

    async fn create_party(&self, party: Party) -> Result<Party, TechServError> {
        self.insert_named(INSERT_PARTY, party.id.to_string(), &party.name)
            .await?;
        Ok(party)
    }

    async fn create_employee(&self, employee: Employee) -> Result<Employee, TechServError> {
        self.insert_named(INSERT_EMPLOYEE, employee.id.to_string(), &employee.name)
            .await?;
        Ok(employee)
    }

    async fn create_trademark(&self, trademark: Trademark) -> Result<Trademark, TechServError> {
        self.insert_named(INSERT_TRADEMARK, trademark.id.to_string(), &trademark.name)
            .await?;
        Ok(trademark)
    }

    fn create_product(
        &self,
        product: Product,
    ) -> impl Future<Output = Result<Product, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT_PRODUCT)
                .bind(product.id.to_string())
                .bind(&product.name)
                .bind(product.cost_price.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(product)
        }
    }

    fn get_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_PRODUCT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn get_products(&self) -> impl Future<Output = Result<Vec<Product>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL_PRODUCTS)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::memory_pool;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn should_keep_product_cost_precision() {
        let repo = SqliteCatalogRepository::new(memory_pool().await);
        let product = Product::builder()
            .name("Thermal paste")
            .cost_price(dec!(3.075))
            .build()
            .unwrap();

        repo.create_product(product.clone()).await.unwrap();

        let fetched = repo.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(fetched.cost_price, dec!(3.075));
        assert_eq!(repo.get_products().await.unwrap(), vec![product]);
    }

    #[tokio::test]
    async fn should_store_named_records() {
        let repo = SqliteCatalogRepository::new(memory_pool().await);
        repo.create_company(Company::new("Workshop").unwrap())
            .await
            .unwrap();
        repo.create_party(Party::new("Ana Torres").unwrap())
            .await
            .unwrap();
        repo.create_employee(Employee::new("Luis").unwrap())
            .await
            .unwrap();
        repo.create_trademark(Trademark::new("HP").unwrap())
            .await
            .unwrap();

        let (count,): (i64,) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM companies) + (SELECT COUNT(*) FROM parties) + (SELECT COUNT(*) FROM employees) + (SELECT COUNT(*) FROM trademarks)",
        )
        .fetch_one(&repo.pool)
        .await
        .unwrap();
        assert_eq!(count, 4);
    }
}
