use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Possible lifecycle states of an order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been placed and awaits shipping.
    #[default]
    Pending,
    Shipped,
    Completed,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl From<OrderStatus> for &'static str {
    fn from(value: OrderStatus) -> Self {
        value.as_str()
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "shipped" => OrderStatus::Shipped,
            "completed" => OrderStatus::Completed,
            "canceled" => OrderStatus::Canceled,
            "pending" => OrderStatus::Pending,
            other => {
                log::warn!("Unknown stored order status `{other}`, using pending");
                OrderStatus::Pending
            }
        }
    }
}

/// Line of an order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    /// Product price captured when the order was placed.
    pub unit_price: Decimal,
}

/// Domain representation of an order with its items.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    pub id: i32,
    /// Opaque identifier of the owning user.
    pub user_id: String,
    pub status: OrderStatus,
    /// Sum of `unit_price * quantity` over all items.
    pub total_amount: Decimal,
    pub items: Vec<OrderItem>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Product and quantity requested for a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: i32,
    pub quantity: i32,
}

/// Payload required to place a new order.
///
/// Prices are not part of the payload: the repository copies the current
/// product price into each item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<NewOrderItem>,
    pub created_at: NaiveDateTime,
}

impl NewOrder {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            items: Vec::new(),
            created_at: chrono::Local::now().naive_utc(),
        }
    }

    /// Add a line for `quantity` units of `product_id`.
    pub fn with_item(mut self, product_id: i32, quantity: i32) -> Self {
        self.items.push(NewOrderItem {
            product_id,
            quantity,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_status_round_trips() {
        assert_eq!(OrderStatus::from("shipped".to_string()), OrderStatus::Shipped);
        assert_eq!(OrderStatus::from("pending".to_string()), OrderStatus::Pending);
    }

    #[test]
    fn unknown_stored_status_falls_back_to_pending() {
        assert_eq!(OrderStatus::from("lost".to_string()), OrderStatus::Pending);
    }
}
