//! Direct `PostgreSQL` access to the `customer_requests` table.
//!
//! Selected with `CLASSIC_MATCHER_STORE=postgres`. Schema lives in
//! `crates/web/migrations/`; run it with `cm-cli migrate`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use classic_matcher_core::{CustomerRequest, NewCustomerRequest, RequestId};

use super::{RecordStore, StoreError};

/// `id` is cast to text so the row decodes into the opaque [`RequestId`]
/// whatever the column type is.
const COLUMNS: &str = "id::text AS id, name, email, phone, vehicle_request, created_at";

/// Record store backed by a `sqlx` connection pool.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Parse a request id into the table's `BIGINT` key.
///
/// Ids that are not integers cannot name a row.
fn row_key(id: &RequestId) -> Result<i64, StoreError> {
    id.as_str()
        .trim()
        .parse()
        .map_err(|_| StoreError::NotFound(id.clone()))
}

#[async_trait]
impl RecordStore for PgRecordStore {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<CustomerRequest>, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM customer_requests ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, CustomerRequest>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn insert(&self, request: &NewCustomerRequest) -> Result<CustomerRequest, StoreError> {
        let query = format!(
            "INSERT INTO customer_requests (name, email, phone, vehicle_request) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CustomerRequest>(&query)
            .bind(&request.name)
            .bind(&request.email)
            .bind(&request.phone)
            .bind(&request.vehicle_request)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: &RequestId) -> Result<(), StoreError> {
        let key = row_key(id)?;
        let result = sqlx::query("DELETE FROM customer_requests WHERE id = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
