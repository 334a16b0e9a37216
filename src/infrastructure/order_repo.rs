use diesel::prelude::*;

use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, Order};
use crate::domain::ports::OrderRepository;
use crate::schema::orders;

use super::diesel_store::DieselStore;
use super::models::OrderRow;

impl OrderRepository for DieselStore {
    fn find_by_id(&self, order_id: &str) -> Result<Option<Order>, DomainError> {
        let mut conn = self.conn()?;

        let row = orders::table
            .filter(orders::order_id.eq(order_id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(Order::try_from).transpose()
    }

    fn list_for_user(
        &self,
        user_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        let mut conn = self.conn()?;

        let offset = (page - 1).max(0).saturating_mul(limit);
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table
                .filter(orders::user_id.eq(user_id))
                .count()
                .get_result(conn)?;

            let rows = orders::table
                .filter(orders::user_id.eq(user_id))
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::order_id.desc()))
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .map(Order::try_from)
                    .collect::<Result<_, _>>()?,
                total,
            })
        })
    }
}
