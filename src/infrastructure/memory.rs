//! Process-local store with optimistic concurrency.
//!
//! Every product carries a revision counter. A checkout attempt records the
//! revision of each product it reads, buffers its writes, and at commit applies
//! them only if none of those revisions moved; otherwise the attempt is a
//! conflict and the [`RetryPolicy`] runs it again.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde_json::Value;

use crate::domain::cart::Cart;
use crate::domain::catalog::{Product, Variant};
use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, Order, ORDER_AGGREGATE, ORDER_PLACED_EVENT};
use crate::domain::ports::{
    CartRepository, CatalogRepository, CatalogTransaction, CheckoutSettings, CheckoutStore,
    OrderRepository, ProfileRepository, SettingsSource,
};
use crate::domain::profile::UserProfile;

use super::retry::RetryPolicy;

/// An outbox entry as it would be published to fulfillment.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}

#[derive(Debug, Clone)]
struct Versioned {
    revision: u64,
    product: Product,
}

#[derive(Debug, Default)]
struct MemoryState {
    products: HashMap<String, Versioned>,
    orders: BTreeMap<String, Order>,
    outbox: Vec<RecordedEvent>,
    carts: HashMap<String, Cart>,
    profiles: HashMap<String, UserProfile>,
    settings: CheckoutSettings,
    last_revision: u64,
}

impl MemoryState {
    /// Revisions come from one store-wide counter and are never reused, even
    /// across a product being removed and added again.
    fn next_revision(&mut self) -> u64 {
        self.last_revision += 1;
        self.last_revision
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
    retry: RetryPolicy,
}

impl InMemoryStore {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            state: Arc::default(),
            retry,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, DomainError> {
        self.state
            .lock()
            .map_err(|e| DomainError::Internal(format!("in-memory store poisoned: {e}")))
    }

    /// Creates or replaces a product, bumping its revision.
    pub fn upsert_product(&self, product: Product) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let revision = state.next_revision();
        state
            .products
            .insert(product.id.clone(), Versioned { revision, product });
        Ok(())
    }

    pub fn remove_product(&self, id: &str) -> Result<Option<Product>, DomainError> {
        Ok(self.lock()?.products.remove(id).map(|v| v.product))
    }

    pub fn set_settings(&self, settings: CheckoutSettings) -> Result<(), DomainError> {
        self.lock()?.settings = settings;
        Ok(())
    }

    pub fn orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.lock()?.orders.values().cloned().collect())
    }

    pub fn outbox(&self) -> Result<Vec<RecordedEvent>, DomainError> {
        Ok(self.lock()?.outbox.clone())
    }
}

struct MemoryTransaction<'s> {
    store: &'s InMemoryStore,
    reads: HashMap<String, u64>,
    writes: BTreeMap<String, Vec<Variant>>,
    orders: Vec<Order>,
}

impl<'s> MemoryTransaction<'s> {
    fn new(store: &'s InMemoryStore) -> Self {
        Self {
            store,
            reads: HashMap::new(),
            writes: BTreeMap::new(),
            orders: Vec::new(),
        }
    }

    fn commit(self) -> Result<(), DomainError> {
        let store = self.store;
        let mut state = store.lock()?;

        for (id, revision) in &self.reads {
            match state.products.get(id) {
                Some(current) if current.revision == *revision => {}
                _ => return Err(DomainError::TransactionConflict),
            }
        }
        if self
            .orders
            .iter()
            .any(|o| state.orders.contains_key(&o.order_id))
        {
            return Err(DomainError::TransactionConflict);
        }

        for (id, variants) in self.writes {
            let revision = state.next_revision();
            if let Some(entry) = state.products.get_mut(&id) {
                entry.product.variants = variants;
                entry.revision = revision;
            }
        }
        let recorded_at = Utc::now();
        for mut order in self.orders {
            order.recorded_at = Some(recorded_at);
            state.outbox.push(RecordedEvent {
                aggregate_type: ORDER_AGGREGATE.to_string(),
                aggregate_id: order.order_id.clone(),
                event_type: ORDER_PLACED_EVENT.to_string(),
                payload: order.placed_event_payload(),
            });
            state.orders.insert(order.order_id.clone(), order);
        }
        Ok(())
    }
}

impl CatalogTransaction for MemoryTransaction<'_> {
    fn product(&mut self, id: &str) -> Result<Option<Product>, DomainError> {
        let state = self.store.lock()?;
        let Some(entry) = state.products.get(id) else {
            return Ok(None);
        };
        self.reads.entry(id.to_string()).or_insert(entry.revision);
        let mut product = entry.product.clone();
        if let Some(pending) = self.writes.get(id) {
            product.variants = pending.clone();
        }
        Ok(Some(product))
    }

    fn write_variants(
        &mut self,
        product_id: &str,
        variants: &[Variant],
    ) -> Result<(), DomainError> {
        if !self.reads.contains_key(product_id) {
            return Err(DomainError::Internal(format!(
                "product {product_id} written without being read"
            )));
        }
        self.writes.insert(product_id.to_string(), variants.to_vec());
        Ok(())
    }

    fn order_exists(&mut self, order_id: &str) -> Result<bool, DomainError> {
        if self.orders.iter().any(|o| o.order_id == order_id) {
            return Ok(true);
        }
        Ok(self.store.lock()?.orders.contains_key(order_id))
    }

    fn insert_order(&mut self, order: &Order) -> Result<(), DomainError> {
        if self.order_exists(&order.order_id)? {
            return Err(DomainError::TransactionConflict);
        }
        self.orders.push(order.clone());
        Ok(())
    }

    fn checkout_settings(&mut self) -> Result<CheckoutSettings, DomainError> {
        Ok(self.store.lock()?.settings.clone())
    }
}

impl CheckoutStore for InMemoryStore {
    fn transact<T, F>(&self, mut body: F) -> Result<T, DomainError>
    where
        F: FnMut(&mut dyn CatalogTransaction) -> Result<T, DomainError>,
    {
        self.retry.run(|_| {
            let mut tx = MemoryTransaction::new(self);
            let value = body(&mut tx)?;
            tx.commit()?;
            Ok(value)
        })
    }
}

impl OrderRepository for InMemoryStore {
    fn find_by_id(&self, order_id: &str) -> Result<Option<Order>, DomainError> {
        Ok(self.lock()?.orders.get(order_id).cloned())
    }

    fn list_for_user(
        &self,
        user_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        let state = self.lock()?;
        let mut mine: Vec<&Order> = state
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = mine.len() as i64;
        let offset = (page - 1).max(0).saturating_mul(limit);
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(0);
        Ok(ListResult {
            items: mine.into_iter().skip(offset).take(limit).cloned().collect(),
            total,
        })
    }
}

impl CartRepository for InMemoryStore {
    fn load_cart(&self, user_id: &str) -> Result<Cart, DomainError> {
        Ok(self.lock()?.carts.get(user_id).cloned().unwrap_or_default())
    }

    fn save_cart(&self, user_id: &str, cart: &Cart) -> Result<(), DomainError> {
        self.lock()?.carts.insert(user_id.to_string(), cart.clone());
        Ok(())
    }

    fn clear_cart(&self, user_id: &str) -> Result<(), DomainError> {
        self.lock()?.carts.remove(user_id);
        Ok(())
    }
}

impl ProfileRepository for InMemoryStore {
    fn find_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DomainError> {
        Ok(self.lock()?.profiles.get(user_id).cloned())
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<(), DomainError> {
        self.lock()?
            .profiles
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }
}

impl CatalogRepository for InMemoryStore {
    fn find_product(&self, id: &str) -> Result<Option<Product>, DomainError> {
        Ok(self.lock()?.products.get(id).map(|v| v.product.clone()))
    }
}

impl SettingsSource for InMemoryStore {
    fn checkout_settings(&self) -> Result<CheckoutSettings, DomainError> {
        Ok(self.lock()?.settings.clone())
    }
}
