//! In-memory record store with operation tracing.
//!
//! Records every call so tests can assert which store operations a handler
//! issued (or that it issued none).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use classic_matcher_core::{CustomerRequest, NewCustomerRequest, RequestId};

use super::{RecordStore, StoreError};

/// Record of a store operation for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Insert { name: String },
    Delete { id: RequestId },
}

#[derive(Debug, Default)]
struct Inner {
    /// Oldest first; `list` reverses.
    rows: Vec<CustomerRequest>,
    next_id: u64,
    operations: Vec<StoreOp>,
    fail_all: bool,
}

/// Process-local record store.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryRecordStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail, simulating an unreachable backend.
    pub fn set_failing(&self, failing: bool) {
        self.lock().fail_all = failing;
    }

    /// Every operation issued so far, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.lock().operations.clone()
    }

    /// Number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    /// Whether the store holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn unavailable() -> StoreError {
    StoreError::Api {
        status: 503,
        message: "store unavailable".to_string(),
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list(&self) -> Result<Vec<CustomerRequest>, StoreError> {
        let mut inner = self.lock();
        inner.operations.push(StoreOp::List);
        if inner.fail_all {
            return Err(unavailable());
        }
        Ok(inner.rows.iter().rev().cloned().collect())
    }

    async fn insert(&self, request: &NewCustomerRequest) -> Result<CustomerRequest, StoreError> {
        let mut inner = self.lock();
        inner.operations.push(StoreOp::Insert {
            name: request.name.clone(),
        });
        if inner.fail_all {
            return Err(unavailable());
        }

        inner.next_id += 1;
        let row = CustomerRequest {
            id: RequestId::new(inner.next_id.to_string()),
            name: request.name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            vehicle_request: request.vehicle_request.clone(),
            created_at: Utc::now(),
        };
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, id: &RequestId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.operations.push(StoreOp::Delete { id: id.clone() });
        if inner.fail_all {
            return Err(unavailable());
        }

        let before = inner.rows.len();
        inner.rows.retain(|row| &row.id != id);
        if inner.rows.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.lock().fail_all {
            return Err(unavailable());
        }
        Ok(())
    }
}
