//! # Shared Order Types
//!
//! Domain types passed between the order store and the gRPC layer. The store
//! produces [`OrderRecord`]s; the service converts them into the wire
//! [`proto::Order`](crate::proto::Order) at the edge.

use crate::proto;

/// The integer type identifying a user (the owning-user column).
pub type UserId = i32;

/// The integer type of the `orders.id` primary key.
pub type OrderId = i32;

/// One stored order as returned to callers.
///
/// The owning user is deliberately absent: callers already know which user
/// they asked for, and the wire format does not echo it back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderRecord {
    pub id: OrderId,
    pub product: String,
    pub quantity: i32,
}

impl From<OrderRecord> for proto::Order {
    fn from(record: OrderRecord) -> Self {
        proto::Order {
            id: record.id,
            product: record.product,
            quantity: record.quantity,
        }
    }
}

impl FromIterator<OrderRecord> for proto::OrderList {
    fn from_iter<I: IntoIterator<Item = OrderRecord>>(iter: I) -> Self {
        proto::OrderList {
            orders: iter.into_iter().map(proto::Order::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_converts_field_for_field() {
        let order = proto::Order::from(OrderRecord {
            id: 7,
            product: "widget".into(),
            quantity: 3,
        });
        assert_eq!(order.id, 7);
        assert_eq!(order.product, "widget");
        assert_eq!(order.quantity, 3);
    }

    #[test]
    fn collecting_records_preserves_store_order() {
        let list: proto::OrderList = [
            OrderRecord {
                id: 9,
                product: "gear".into(),
                quantity: 1,
            },
            OrderRecord {
                id: 2,
                product: "bolt".into(),
                quantity: 40,
            },
        ]
        .into_iter()
        .collect();

        let ids: Vec<_> = list.orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![9, 2]);
    }

    #[test]
    fn empty_input_yields_empty_list() {
        let list: proto::OrderList = core::iter::empty::<OrderRecord>().collect();
        assert!(list.orders.is_empty());
    }
}
