use super::OrderStore;
use core::time::Duration;
use orders_core::{
    Error, Result,
    types::{OrderRecord, UserId},
};
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// In-memory [`OrderStore`] used by handler tests.
///
/// Rows are kept as `(owner, record)` pairs. Failures and latency can be
/// injected to drive the handler's error paths.
#[derive(Default)]
pub struct MemoryStore {
    rows: Vec<(UserId, OrderRecord)>,
    delay: Option<Duration>,
    query_failure: Mutex<Option<Error>>,
    bootstrap_failures: AtomicUsize,
    pub bootstraps: AtomicUsize,
    pub queries: AtomicUsize,
    pub closed: AtomicUsize,
}

impl MemoryStore {
    pub fn with_rows(rows: impl IntoIterator<Item = (UserId, OrderRecord)>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every query fails with `err` until cleared.
    pub fn failing_with(self, err: Error) -> Self {
        *self.query_failure.lock().unwrap() = Some(err);
        self
    }

    /// The next `n` bootstrap attempts fail as unavailable.
    pub fn failing_bootstraps(self, n: usize) -> Self {
        self.bootstrap_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn clear_failure(&self) {
        *self.query_failure.lock().unwrap() = None;
    }
}

#[tonic::async_trait]
impl OrderStore for MemoryStore {
    async fn bootstrap_schema(&self) -> Result<()> {
        self.bootstraps.fetch_add(1, Ordering::SeqCst);
        let remaining = self.bootstrap_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.bootstrap_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::Unavailable {
                context: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<OrderRecord>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.query_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self
            .rows
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}
