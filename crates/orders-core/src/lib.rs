#![doc = include_str!("../README.md")]

mod common;
pub use common::*;

/// gRPC service and message definitions generated from `proto/orders.proto`.
///
/// ## Service
///
/// - `OrderService::GetOrders` - Returns every order owned by a user.
///
/// ## Messages
///
/// - [`UserIdRequest`](proto::UserIdRequest) - The user to look up.
/// - [`Order`](proto::Order) - One order: `id`, `product`, `quantity`. The
///   owning user is not echoed back.
/// - [`OrderList`](proto::OrderList) - All matching orders, in no particular
///   order.
pub mod proto {
    tonic::include_proto!("orders");

    /// Encoded descriptor set for `orders.proto`, served by gRPC reflection.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("orders_descriptor");
}
