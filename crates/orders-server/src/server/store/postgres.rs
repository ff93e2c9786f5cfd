//! PostgreSQL implementation of [`OrderStore`] on top of a shared `sqlx` pool.
//!
//! The pool is created once at startup with lazy connections, so the server
//! comes up even while the database is down. Each call checks a connection
//! out for exactly one statement and hands it back when the future completes
//! or is dropped.

use super::OrderStore;
use crate::server::config::ServerConfig;
use orders_core::{
    Error, Result,
    types::{OrderId, OrderRecord, UserId},
};
use sqlx::{PgPool, postgres::PgPoolOptions};

const CREATE_ORDERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS orders (\
     id SERIAL PRIMARY KEY, \
     user_id INTEGER, \
     product TEXT, \
     quantity INTEGER)";

const SELECT_ORDERS_FOR_USER: &str = "SELECT id, product, quantity FROM orders WHERE user_id = $1";

/// Row shape of [`SELECT_ORDERS_FOR_USER`]. Every column except `id` is
/// nullable in the table definition.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    product: Option<String>,
    quantity: Option<i32>,
}

impl From<OrderRow> for OrderRecord {
    fn from(row: OrderRow) -> Self {
        OrderRecord {
            id: row.id,
            product: row.product.unwrap_or_default(),
            quantity: row.quantity.unwrap_or_default(),
        }
    }
}

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Builds the shared pool without opening a connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the connection string cannot be
    /// parsed.
    pub fn connect_lazy(config: &ServerConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect_lazy(&config.database_url)
            .map_err(classify)?;
        Ok(Self::from_pool(pool))
    }

    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[tonic::async_trait]
impl OrderStore for PgOrderStore {
    async fn bootstrap_schema(&self) -> Result<()> {
        sqlx::query(CREATE_ORDERS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<OrderRecord>> {
        let rows: Vec<OrderRow> = sqlx::query_as(SELECT_ORDERS_FOR_USER)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;
        Ok(rows.into_iter().map(OrderRecord::from).collect())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// SQLSTATE classes that mean "could not talk to the database" rather than
/// "the statement was wrong": connection exception (08), invalid authorization
/// (28), insufficient resources (53) and operator intervention (57).
const UNAVAILABLE_SQLSTATE_CLASSES: [&str; 4] = ["08", "28", "53", "57"];

/// Sorts a `sqlx` failure into the service's error taxonomy.
pub(crate) fn classify(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Configuration(_) => Error::Configuration {
            reason: err.to_string(),
        },
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => Error::Unavailable {
            context: err.to_string(),
        },
        sqlx::Error::Database(db)
            if db.code().is_some_and(|code| {
                UNAVAILABLE_SQLSTATE_CLASSES
                    .iter()
                    .any(|class| code.starts_with(class))
            }) =>
        {
            Error::Unavailable {
                context: err.to_string(),
            }
        }
        _ => Error::Query {
            context: err.to_string(),
        },
    }
}
