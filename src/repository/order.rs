use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::order::{NewOrder as DomainNewOrder, Order as DomainOrder, OrderStatus};
use crate::models::order::{
    NewOrder as DbNewOrder, NewOrderItem as DbNewOrderItem, Order as DbOrder,
    OrderItem as DbOrderItem,
};
use crate::repository::{
    DieselRepository, OrderReader, OrderWriter, RepositoryError, RepositoryResult,
};

impl OrderReader for DieselRepository {
    fn get_order_by_id(&mut self, id: i32) -> RepositoryResult<DomainOrder> {
        load_order(self.conn(), id)
    }
}

impl OrderWriter for DieselRepository {
    fn create_order(&mut self, new_order: &DomainNewOrder) -> RepositoryResult<DomainOrder> {
        use crate::schema::{order_items, orders, products};

        if new_order.items.is_empty() {
            return Err(RepositoryError::InvalidFormat(
                "order must contain at least one item".to_string(),
            ));
        }
        if let Some(item) = new_order.items.iter().find(|item| item.quantity <= 0) {
            return Err(RepositoryError::InvalidFormat(format!(
                "quantity for product {} must be positive",
                item.product_id
            )));
        }

        let conn = self.conn();

        let product_ids: Vec<i32> = new_order.items.iter().map(|item| item.product_id).collect();
        let prices: HashMap<i32, i64> = products::table
            .filter(products::id.eq_any(&product_ids))
            .select((products::id, products::price_cents))
            .load::<(i32, i64)>(conn)?
            .into_iter()
            .collect();

        let mut lines = Vec::with_capacity(new_order.items.len());
        let mut total_cents: i64 = 0;
        for item in &new_order.items {
            let unit_price_cents = *prices
                .get(&item.product_id)
                .ok_or(RepositoryError::NotFound)?;
            total_cents = unit_price_cents
                .checked_mul(i64::from(item.quantity))
                .and_then(|line| total_cents.checked_add(line))
                .ok_or_else(|| {
                    RepositoryError::InvalidFormat("order total is out of range".to_string())
                })?;
            lines.push((item.product_id, item.quantity, unit_price_cents));
        }

        let order = diesel::insert_into(orders::table)
            .values(&DbNewOrder {
                user_id: new_order.user_id.as_str(),
                status: OrderStatus::Pending.as_str(),
                total_cents,
                created_at: new_order.created_at,
                updated_at: new_order.created_at,
            })
            .get_result::<DbOrder>(conn)?;

        let rows: Vec<DbNewOrderItem> = lines
            .into_iter()
            .map(|(product_id, quantity, unit_price_cents)| DbNewOrderItem {
                order_id: order.id,
                product_id,
                quantity,
                unit_price_cents,
            })
            .collect();

        diesel::insert_into(order_items::table)
            .values(&rows)
            .execute(conn)?;

        load_order(conn, order.id)
    }

    fn update_order_status(
        &mut self,
        order_id: i32,
        status: OrderStatus,
    ) -> RepositoryResult<DomainOrder> {
        use crate::schema::orders;

        let conn = self.conn();

        let updated = diesel::update(orders::table.find(order_id))
            .set((
                orders::status.eq(status.as_str()),
                orders::updated_at.eq(chrono::Local::now().naive_utc()),
            ))
            .execute(conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }

        load_order(conn, order_id)
    }
}

fn load_order(conn: &mut SqliteConnection, order_id: i32) -> RepositoryResult<DomainOrder> {
    use crate::schema::{order_items, orders};

    let order = orders::table
        .find(order_id)
        .first::<DbOrder>(conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;

    let items = order_items::table
        .filter(order_items::order_id.eq(order.id))
        .order(order_items::id.asc())
        .load::<DbOrderItem>(conn)?;

    Ok(DomainOrder::from((order, items)))
}
