use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::money::cents_to_decimal;
use crate::domain::order::{Order as DomainOrder, OrderItem as DomainOrderItem, OrderStatus};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::orders)]
pub struct Order {
    pub id: i32,
    pub user_id: String,
    pub status: String,
    pub total_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder<'a> {
    pub user_id: &'a str,
    pub status: &'a str,
    pub total_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::order_items)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

impl From<OrderItem> for DomainOrderItem {
    fn from(value: OrderItem) -> Self {
        Self {
            id: value.id,
            order_id: value.order_id,
            product_id: value.product_id,
            quantity: value.quantity,
            unit_price: cents_to_decimal(value.unit_price_cents),
        }
    }
}

impl From<(Order, Vec<OrderItem>)> for DomainOrder {
    fn from((order, items): (Order, Vec<OrderItem>)) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            status: OrderStatus::from(order.status),
            total_amount: cents_to_decimal(order.total_cents),
            items: items.into_iter().map(Into::into).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}
