use diesel::prelude::*;
use diesel::upsert::excluded;
use serde_json::Value;

use crate::domain::cart::{Cart, CartLine};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::carts;

use super::diesel_store::DieselStore;
use super::models::{decode, encode, CartRow};

impl CartRepository for DieselStore {
    fn load_cart(&self, user_id: &str) -> Result<Cart, DomainError> {
        let mut conn = self.conn()?;
        let lines: Option<Value> = carts::table
            .filter(carts::user_id.eq(user_id))
            .select(carts::lines)
            .first(&mut conn)
            .optional()?;

        match lines {
            Some(lines) => Ok(Cart::from_lines(decode::<Vec<CartLine>>(lines, "cart")?)),
            None => Ok(Cart::default()),
        }
    }

    fn save_cart(&self, user_id: &str, cart: &Cart) -> Result<(), DomainError> {
        let row = CartRow {
            user_id: user_id.to_string(),
            lines: encode(cart.lines(), "cart")?,
        };
        let mut conn = self.conn()?;
        diesel::insert_into(carts::table)
            .values(&row)
            .on_conflict(carts::user_id)
            .do_update()
            .set((
                carts::lines.eq(excluded(carts::lines)),
                carts::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;
        Ok(())
    }

    fn clear_cart(&self, user_id: &str) -> Result<(), DomainError> {
        let mut conn = self.conn()?;
        diesel::delete(carts::table.filter(carts::user_id.eq(user_id))).execute(&mut conn)?;
        Ok(())
    }
}
