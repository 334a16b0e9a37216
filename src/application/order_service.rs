use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::OrderRepository;
use crate::domain::profile::Identity;

use super::require_identity;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone)]
pub struct OrderPage {
    pub items: Vec<Order>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Another user's order is reported as missing.
    pub fn get_order(
        &self,
        identity: Option<&Identity>,
        order_id: &str,
    ) -> Result<Order, DomainError> {
        let identity = require_identity(identity)?;
        self.repo
            .find_by_id(order_id)?
            .filter(|o| o.user_id == identity.user_id)
            .ok_or(DomainError::NotFound)
    }

    pub fn list_orders(
        &self,
        identity: Option<&Identity>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<OrderPage, DomainError> {
        let identity = require_identity(identity)?;
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let result = self.repo.list_for_user(&identity.user_id, page, limit)?;
        Ok(OrderPage {
            items: result.items,
            total: result.total,
            page,
            limit,
        })
    }
}
