//! Bounded admission for `GetOrders` calls.
//!
//! [`AdmissionGate`] caps how many calls run the store path at once, using a
//! shared [`Semaphore`]. Calls past the cap wait for a permit. Closing the
//! gate turns every new call away with [`Error::ServiceShutdown`] while
//! in-flight calls finish.

use crate::server::telemetry::{decrement_requests_inflight, increment_requests_inflight};
use core::time::Duration;
use orders_core::Error;
use std::sync::Arc;
use tokio::{
    sync::{OwnedSemaphorePermit, Semaphore},
    time::{sleep, timeout},
};

pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    capacity: usize,
    shutdown_timeout: Duration,
}

/// A held slot. Dropping it frees the slot, including when the owning call is
/// cancelled mid-flight.
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        decrement_requests_inflight();
    }
}

impl AdmissionGate {
    pub fn new(capacity: usize, shutdown_timeout: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            shutdown_timeout,
        }
    }

    /// Waits for a free slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceShutdown`] once the gate has been closed.
    pub async fn acquire(&self) -> Result<AdmissionPermit, Error> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| Error::ServiceShutdown)?;
        increment_requests_inflight();
        Ok(AdmissionPermit { _permit: permit })
    }

    /// Number of calls currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.capacity
            .saturating_sub(self.permits.available_permits())
    }

    /// Stops admitting new calls, then waits up to the configured shutdown
    /// timeout for in-flight calls to drain.
    pub async fn shutdown(&self) {
        #[cfg(feature = "tracing")]
        tracing::info!("Refusing new requests");
        self.permits.close();

        #[cfg(feature = "tracing")]
        tracing::info!("Draining in-flight requests ({} active)", self.in_flight());
        let drained = timeout(self.shutdown_timeout, async {
            while self.in_flight() > 0 {
                sleep(Duration::from_millis(50)).await;
            }
        })
        .await;

        match drained {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("All in-flight requests drained");
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "Graceful drain timed out ({} requests still active)",
                    self.in_flight()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracks_held_permits() {
        let gate = AdmissionGate::new(2, Duration::from_secs(1));
        assert_eq!(gate.in_flight(), 0);

        let a = gate.acquire().await.unwrap();
        let b = gate.acquire().await.unwrap();
        assert_eq!(gate.in_flight(), 2);

        drop(a);
        assert_eq!(gate.in_flight(), 1);
        drop(b);
        assert_eq!(gate.in_flight(), 0);
    }

    #[tokio::test]
    async fn waits_when_full() {
        let gate = AdmissionGate::new(1, Duration::from_secs(1));
        let held = gate.acquire().await.unwrap();

        let blocked = timeout(Duration::from_millis(50), gate.acquire()).await;
        assert!(blocked.is_err(), "second caller should wait for a slot");

        drop(held);
        let next = timeout(Duration::from_millis(500), gate.acquire()).await;
        assert!(matches!(next, Ok(Ok(_))));
    }

    #[tokio::test]
    async fn closed_gate_rejects_new_calls() {
        let gate = AdmissionGate::new(4, Duration::from_millis(100));
        gate.shutdown().await;

        assert!(matches!(
            gate.acquire().await,
            Err(Error::ServiceShutdown)
        ));
    }

    #[tokio::test]
    async fn shutdown_waits_for_in_flight_calls() {
        let gate = Arc::new(AdmissionGate::new(2, Duration::from_secs(2)));
        let permit = gate.acquire().await.unwrap();

        let release = tokio::spawn(async move {
            sleep(Duration::from_millis(100)).await;
            drop(permit);
        });

        gate.shutdown().await;
        assert_eq!(gate.in_flight(), 0);
        release.await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_gives_up_after_timeout() {
        let gate = AdmissionGate::new(1, Duration::from_millis(100));
        let _stuck = gate.acquire().await.unwrap();

        let started = tokio::time::Instant::now();
        gate.shutdown().await;
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(gate.in_flight(), 1);
    }
}
