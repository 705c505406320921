//! `SQLite` implementation of [`AddressRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use techserv_app::ports::AddressRepository;
use techserv_domain::address::Address;
use techserv_domain::error::TechServError;
use techserv_domain::id::{AddressId, PartyId};

use crate::decode::parse;
use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Address`].
struct Wrapper(Address);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let party_id: String = row.try_get("party_id")?;

        Ok(Self(Address {
            id: parse(&id)?,
            party_id: parse(&party_id)?,
            street: row.try_get("street")?,
            city: row.try_get("city")?,
            country_code: row.try_get("country_code")?,
            subdivision_code: row.try_get("subdivision_code")?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO addresses (id, party_id, street, city, country_code, subdivision_code)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM addresses WHERE id = ?";
const SELECT_BY_PARTY: &str = "SELECT * FROM addresses WHERE party_id = ? ORDER BY rowid";

/// `SQLite`-backed address repository.
#[derive(Clone)]
pub struct SqliteAddressRepository {
    pool: SqlitePool,
}

impl SqliteAddressRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AddressRepository for SqliteAddressRepository {
    fn create(&self, address: Address) -> impl Future<Output = Result<Address, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(address.id.to_string())
                .bind(address.party_id.to_string())
                .bind(&address.street)
                .bind(&address.city)
                .bind(&address.country_code)
                .bind(&address.subdivision_code)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(address)
        }
    }

    fn get_by_id(
        &self,
        id: AddressId,
    ) -> impl Future<Output = Result<Option<Address>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn find_by_party(
        &self,
        party_id: PartyId,
    ) -> impl Future<Output = Result<Vec<Address>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_PARTY)
                .bind(party_id.to_string())
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

    #[tokio::test]
    async fn should_find_addresses_of_party() {
        let repo = SqliteAddressRepository::new(memory_pool().await);
        let party = PartyId::new();
        let mut home = Address::new(party);
        home.street = Some("Av. Universitaria".to_string());
        home.country_code = Some("EC".to_string());
        repo.create(home.clone()).await.unwrap();
        repo.create(Address::new(PartyId::new())).await.unwrap();

        assert_eq!(repo.find_by_party(party).await.unwrap(), vec![home.clone()]);
        assert_eq!(repo.get_by_id(home.id).await.unwrap(), Some(home));
    }
}
