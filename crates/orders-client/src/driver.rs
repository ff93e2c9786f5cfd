//! Sequential `GetOrders` walk over a list of user ids.
//!
//! Each id gets exactly one call. A failed call is printed and the walk moves
//! on, so one bad id never hides the results for the rest.

use orders_core::proto::{OrderList, UserIdRequest, order_service_client::OrderServiceClient};
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};
use tonic::{Status, transport::Channel};

pub const DEFAULT_MARKER: &str = "crates/orders-core/proto/orders.proto";

const RULE_WIDTH: usize = 50;

/// Per-run tally of calls that returned a response versus a status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Ensures `marker` exists, returning the missing path otherwise.
pub fn check_marker(marker: &Path) -> Result<(), PathBuf> {
    if marker.exists() {
        Ok(())
    } else {
        Err(marker.to_path_buf())
    }
}

/// Calls `GetOrders` for every id in `user_ids`, one after another, writing a
/// human-readable report to `out`.
///
/// # Errors
///
/// Only fails if writing to `out` fails. RPC failures are part of the report.
pub async fn run<W: Write>(
    client: &mut OrderServiceClient<Channel>,
    endpoint: &str,
    user_ids: &[i32],
    out: &mut W,
) -> io::Result<RunSummary> {
    let mut summary = RunSummary::default();

    writeln!(out, "Testing gRPC OrderService via gateway at {endpoint}")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    for &user_id in user_ids {
        writeln!(out)?;
        writeln!(out, "GetOrders for user_id: {user_id}")?;

        let outcome = client
            .get_orders(UserIdRequest { user_id })
            .await
            .map(tonic::Response::into_inner);

        match &outcome {
            Ok(_) => summary.succeeded += 1,
            Err(_) => summary.failed += 1,
        }
        write_outcome(out, user_id, &outcome)?;
    }

    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(
        out,
        "gRPC service test complete: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    )?;
    out.flush()?;

    Ok(summary)
}

fn write_outcome<W: Write>(
    out: &mut W,
    user_id: i32,
    outcome: &Result<OrderList, Status>,
) -> io::Result<()> {
    match outcome {
        Ok(list) if list.orders.is_empty() => {
            writeln!(out, "No orders found for user {user_id}")
        }
        Ok(list) => {
            writeln!(
                out,
                "Found {} orders for user {user_id}:",
                list.orders.len()
            )?;
            for order in &list.orders {
                writeln!(
                    out,
                    "   - Order ID: {}, Product: {}, Quantity: {}",
                    order.id, order.product, order.quantity
                )?;
            }
            Ok(())
        }
        Err(status) => writeln!(
            out,
            "Error for user {user_id}: {:?} - {}",
            status.code(),
            status.message()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orders_core::proto::{
        Order,
        order_service_server::{OrderService, OrderServiceServer},
    };
    use tokio::net::TcpListener;
    use tokio_stream::wrappers::TcpListenerStream;
    use tonic::{Request, Response, transport::Server};

    /// Serves user 1 one order, fails user 3, and has nothing for anyone else.
    struct StubOrders;

    #[tonic::async_trait]
    impl OrderService for StubOrders {
        async fn get_orders(
            &self,
            req: Request<UserIdRequest>,
        ) -> Result<Response<OrderList>, Status> {
            match req.into_inner().user_id {
                1 => Ok(Response::new(OrderList {
                    orders: vec![Order {
                        id: 7,
                        product: "widget".to_string(),
                        quantity: 3,
                    }],
                })),
                3 => Err(Status::unavailable(
                    "Database unavailable: connection refused",
                )),
                _ => Ok(Response::new(OrderList::default())),
            }
        }
    }

    async fn spawn_stub() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(
            Server::builder()
                .add_service(OrderServiceServer::new(StubOrders))
                .serve_with_incoming(TcpListenerStream::new(listener)),
        );
        format!("http://{addr}")
    }

    fn client_for(endpoint: &str) -> OrderServiceClient<Channel> {
        let channel = tonic::transport::Endpoint::from_shared(endpoint.to_string())
            .unwrap()
            .connect_lazy();
        OrderServiceClient::new(channel)
    }

    #[tokio::test]
    async fn reports_orders_empty_results_and_faults() {
        let endpoint = spawn_stub().await;
        let mut client = client_for(&endpoint);
        let mut out = Vec::new();

        let summary = run(&mut client, &endpoint, &[1, 2, 3, 4, 5], &mut out)
            .await
            .unwrap();
        let report = String::from_utf8(out).unwrap();

        assert_eq!(
            summary,
            RunSummary {
                succeeded: 4,
                failed: 1
            }
        );
        assert!(report.contains("Found 1 orders for user 1:"));
        assert!(report.contains("   - Order ID: 7, Product: widget, Quantity: 3"));
        assert!(report.contains("No orders found for user 2"));
        assert!(
            report.contains("Error for user 3: Unavailable - Database unavailable: connection refused")
        );
        // The fault for user 3 must not stop the walk.
        assert!(report.contains("No orders found for user 5"));
        assert!(report.contains("gRPC service test complete: 4 succeeded, 1 failed"));
    }

    #[tokio::test]
    async fn calls_users_in_the_given_order() {
        let endpoint = spawn_stub().await;
        let mut client = client_for(&endpoint);
        let mut out = Vec::new();

        run(&mut client, &endpoint, &[5, 1, 4], &mut out)
            .await
            .unwrap();
        let report = String::from_utf8(out).unwrap();

        let pos = |id: i32| {
            report
                .find(&format!("GetOrders for user_id: {id}\n"))
                .unwrap()
        };
        assert!(pos(5) < pos(1));
        assert!(pos(1) < pos(4));
    }

    #[tokio::test]
    async fn unreachable_gateway_fails_every_id_but_completes() {
        // Nothing listens on port 1.
        let endpoint = "http://127.0.0.1:1";
        let mut client = client_for(endpoint);
        let mut out = Vec::new();

        let summary = run(&mut client, endpoint, &[1, 2, 3, 4, 5], &mut out)
            .await
            .unwrap();
        let report = String::from_utf8(out).unwrap();

        assert_eq!(summary.failed, 5);
        assert_eq!(summary.succeeded, 0);
        for id in 1..=5 {
            assert!(report.contains(&format!("Error for user {id}: ")));
        }
        assert!(report.contains("gRPC service test complete: 0 succeeded, 5 failed"));
    }

    #[test]
    fn marker_check() {
        let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        assert!(check_marker(&manifest).is_ok());

        let missing = Path::new("no/such/dir/orders.proto");
        assert_eq!(check_marker(missing), Err(missing.to_path_buf()));
    }

    #[test]
    fn default_marker_points_at_the_proto() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        assert!(check_marker(&root.join(DEFAULT_MARKER)).is_ok());
    }
}
