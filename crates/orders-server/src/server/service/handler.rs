//! gRPC service implementation for order lookup.
//!
//! This module defines [`OrderLookupService`], the concrete implementation of
//! the [`OrderService`] gRPC service defined in `orders.proto`.
//!
//! ## Responsibilities
//!
//! - Bootstrap the `orders` schema once per process, retrying lazily if the
//!   database was down at startup.
//! - Admit at most `MAX_CONCURRENT_REQUESTS` calls into the store at once.
//! - Bound every call by `QUERY_TIMEOUT_MS`.
//! - Map store failures onto distinct gRPC status codes.
//! - Refuse new work and drain in-flight calls on shutdown.

use crate::server::{
    admission::AdmissionGate,
    config::ServerConfig,
    store::OrderStore,
    telemetry::{
        increment_request_errors, increment_requests, record_orders_per_response,
        record_request_duration,
    },
};
use core::time::Duration;
use orders_core::{
    Error,
    proto::{OrderList, UserIdRequest, order_service_server::OrderService},
    types::{OrderRecord, UserId},
};
use std::{sync::Arc, time::Instant};
use tokio::{sync::OnceCell, time::timeout};
use tonic::{Request, Response, Status};

/// gRPC service returning the orders owned by a user.
///
/// Cloning is cheap: the store, admission gate and schema state are shared
/// behind `Arc`s, so every clone handed to tonic sees the same pool and limits.
pub struct OrderLookupService<S> {
    store: Arc<S>,
    gate: Arc<AdmissionGate>,
    schema: Arc<OnceCell<()>>,
    bootstrap_schema: bool,
    query_timeout: Duration,
}

impl<S> Clone for OrderLookupService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            gate: Arc::clone(&self.gate),
            schema: Arc::clone(&self.schema),
            bootstrap_schema: self.bootstrap_schema,
            query_timeout: self.query_timeout,
        }
    }
}

impl<S: OrderStore> OrderLookupService<S> {
    pub fn new(store: S, config: &ServerConfig) -> Self {
        Self {
            store: Arc::new(store),
            gate: Arc::new(AdmissionGate::new(
                config.max_concurrent_requests,
                config.shutdown_timeout,
            )),
            schema: Arc::new(OnceCell::new()),
            bootstrap_schema: config.bootstrap_schema,
            query_timeout: config.query_timeout,
        }
    }

    /// Attempts the one-time schema bootstrap ahead of the first request.
    ///
    /// A failure is logged and not fatal: the bootstrap is retried before the
    /// next query, so the server can start while the database is down.
    pub async fn warm_up(&self) {
        if let Err(_e) = self.ensure_schema().await {
            #[cfg(feature = "tracing")]
            tracing::warn!("Schema bootstrap deferred: {}", _e);
        }
    }

    /// Creates the `orders` table if needed. Only the first successful run
    /// touches the database; later calls return immediately.
    async fn ensure_schema(&self) -> Result<(), Error> {
        if !self.bootstrap_schema {
            return Ok(());
        }
        self.schema
            .get_or_try_init(|| async {
                self.store.bootstrap_schema().await?;
                #[cfg(feature = "tracing")]
                tracing::info!("Schema bootstrap complete");
                Ok::<(), Error>(())
            })
            .await?;
        Ok(())
    }

    /// Returns every order owned by `user_id`.
    ///
    /// The whole call, including waiting for an admission slot, runs under
    /// the configured query timeout. Dropping the returned future releases
    /// the slot and the pooled connection.
    ///
    /// # Errors
    ///
    /// - [`Error::ServiceShutdown`] once shutdown has begun.
    /// - [`Error::Timeout`] if the deadline elapses.
    /// - [`Error::Unavailable`] / [`Error::Query`] from the store.
    pub async fn lookup(&self, user_id: UserId) -> Result<Vec<OrderRecord>, Error> {
        let work = async {
            let _permit = self.gate.acquire().await?;
            self.ensure_schema().await?;
            self.store.orders_for_user(user_id).await
        };

        match timeout(self.query_timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                elapsed_ms: self.query_timeout.as_millis() as u64,
            }),
        }
    }

    /// Stops admitting calls, waits for in-flight calls to drain, then closes
    /// the store.
    pub async fn shutdown(&self) {
        self.gate.shutdown().await;
        self.store.close().await;

        #[cfg(feature = "tracing")]
        tracing::info!("Order store closed");
    }
}

#[tonic::async_trait]
impl<S: OrderStore> OrderService for OrderLookupService<S> {
    /// Handles a `GetOrders` request.
    ///
    /// Any `user_id` is accepted; one without orders yields an empty list.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(user_id = req.get_ref().user_id)))]
    async fn get_orders(
        &self,
        req: Request<UserIdRequest>,
    ) -> Result<Response<OrderList>, Status> {
        let start = Instant::now();
        let user_id = req.into_inner().user_id;
        increment_requests();

        let result = self.lookup(user_id).await;
        record_request_duration(start.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(records) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Found {} orders", records.len());
                record_orders_per_response(records.len() as f64);
                Ok(Response::new(records.into_iter().collect()))
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("GetOrders failed: {}", e);
                let status = Status::from(e);
                increment_request_errors(status.code());
                Err(status)
            }
        }
    }
}
