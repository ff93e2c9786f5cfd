//! Order persistence.
//!
//! The gRPC handler talks to storage only through the [`OrderStore`] trait.
//! Production uses [`postgres::PgOrderStore`]; tests substitute an in-memory
//! store so handler behavior can be exercised without a database.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use orders_core::{
    Result,
    types::{OrderRecord, UserId},
};

/// Read access to the `orders` table.
#[tonic::async_trait]
pub trait OrderStore: Send + Sync + 'static {
    /// Creates the backing table if it does not exist yet. Must be idempotent.
    async fn bootstrap_schema(&self) -> Result<()>;

    /// Returns every order owned by `user_id`, in whatever order the store
    /// yields them. An unknown user yields an empty vector, never an error.
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<OrderRecord>>;

    /// Releases pooled resources. Called once during shutdown.
    async fn close(&self) {}
}
