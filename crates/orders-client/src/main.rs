#![doc = include_str!("../README.md")]

mod driver;

use clap::Parser;
use orders_core::proto::order_service_client::OrderServiceClient;
use std::{io, path::PathBuf, process::ExitCode};
use tonic::{codec::CompressionEncoding, transport::Endpoint};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "orders-client",
    version,
    about = "Calls OrderService.GetOrders for a list of users and prints the results"
)]
struct CliArgs {
    /// Gateway address the driver connects through.
    ///
    /// Environment variable: `ORDERS_ENDPOINT`
    #[arg(long, env = "ORDERS_ENDPOINT", default_value_t = String::from("http://localhost:9090"))]
    endpoint: String,

    /// Comma separated user ids to look up, in order.
    ///
    /// Environment variable: `ORDERS_USER_IDS`
    #[arg(
        long,
        env = "ORDERS_USER_IDS",
        value_delimiter = ',',
        allow_negative_numbers = true,
        default_values_t = [1, 2, 3, 4, 5]
    )]
    user_ids: Vec<i32>,

    /// File that must exist relative to the working directory. Guards against
    /// running the driver from the wrong place.
    ///
    /// Environment variable: `ORDERS_PROTO_MARKER`
    #[arg(long, env = "ORDERS_PROTO_MARKER", default_value = driver::DEFAULT_MARKER)]
    marker: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();

    if let Err(missing) = driver::check_marker(&args.marker) {
        eprintln!("Error: please run this from the project root directory");
        eprintln!("   Expected: {}", missing.display());
        return Ok(ExitCode::FAILURE);
    }

    // One channel for the whole run. Connecting lazily turns an unreachable
    // gateway into a per-id failure instead of aborting up front.
    let channel = Endpoint::from_shared(args.endpoint.clone())?.connect_lazy();
    let mut client = OrderServiceClient::new(channel).accept_compressed(CompressionEncoding::Gzip);

    let mut stdout = io::stdout().lock();
    driver::run(&mut client, &args.endpoint, &args.user_ids, &mut stdout).await?;

    Ok(ExitCode::SUCCESS)
}
