//! services/storefront/src/web/state.rs
//!
//! Defines the application's shared state and the per-visitor storefronts.

use crate::config::Config;
use cinema_core::ports::{AuthService, CatalogService};
use cinema_core::Storefront;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Visitors)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogService>,
    pub auth: Arc<dyn AuthService>,
    pub visitors: Arc<VisitorRegistry>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        auth: Arc<dyn AuthService>,
        config: &Config,
    ) -> Self {
        Self {
            catalog,
            auth,
            visitors: Arc::new(VisitorRegistry::new(config.visitor_idle, config.max_visitors)),
        }
    }

    /// The storefront that backs this visitor's page session, created on first use.
    pub async fn storefront(&self, visitor: Visitor) -> Arc<Storefront> {
        self.visitors
            .get_or_create(visitor.0, || {
                Storefront::new(self.catalog.clone(), self.auth.clone())
            })
            .await
    }

    /// The visitor's storefront if one is live. Never creates one.
    pub async fn existing_storefront(&self, visitor: Visitor) -> Option<Arc<Storefront>> {
        self.visitors.get(visitor.0).await
    }
}

//=========================================================================================
// Visitors (One Storefront per Page Session)
//=========================================================================================

/// Identifies one browser page session. Set by the visitor middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Visitor(pub Uuid);

struct VisitorEntry {
    storefront: Arc<Storefront>,
    last_seen: Instant,
    /// Access order, for dropping the least recently seen entry at capacity.
    touched: u64,
}

#[derive(Default)]
struct Visitors {
    entries: HashMap<Uuid, VisitorEntry>,
    clock: u64,
}

impl Visitors {
    fn touch(&mut self, visitor_id: Uuid) -> Option<Arc<Storefront>> {
        self.clock += 1;
        let clock = self.clock;
        self.entries.get_mut(&visitor_id).map(|entry| {
            entry.last_seen = Instant::now();
            entry.touched = clock;
            entry.storefront.clone()
        })
    }

    fn evict_idle(&mut self, idle: Duration) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.last_seen.elapsed() < idle);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!("Evicted {} idle visitors", evicted);
        }
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.touched)
            .map(|(id, _)| *id);
        if let Some(id) = oldest {
            debug!("Visitor limit reached, evicting {}", id);
            self.entries.remove(&id);
        }
    }
}

/// Live storefronts keyed by visitor. Entries idle for `idle` are swept on
/// every access, and the registry never holds more than `capacity` of them.
pub struct VisitorRegistry {
    visitors: Mutex<Visitors>,
    idle: Duration,
    capacity: usize,
}

impl VisitorRegistry {
    pub fn new(idle: Duration, capacity: usize) -> Self {
        Self {
            visitors: Mutex::new(Visitors::default()),
            idle,
            capacity: capacity.max(1),
        }
    }

    pub async fn get(&self, visitor_id: Uuid) -> Option<Arc<Storefront>> {
        let mut visitors = self.visitors.lock().await;
        visitors.evict_idle(self.idle);
        visitors.touch(visitor_id)
    }

    pub async fn get_or_create(
        &self,
        visitor_id: Uuid,
        create: impl FnOnce() -> Storefront,
    ) -> Arc<Storefront> {
        let mut visitors = self.visitors.lock().await;
        visitors.evict_idle(self.idle);
        if let Some(storefront) = visitors.touch(visitor_id) {
            return storefront;
        }

        while visitors.entries.len() >= self.capacity {
            visitors.evict_oldest();
        }
        debug!("Creating storefront for visitor {}", visitor_id);
        let storefront = Arc::new(create());
        let touched = visitors.clock;
        visitors.entries.insert(
            visitor_id,
            VisitorEntry {
                storefront: storefront.clone(),
                last_seen: Instant::now(),
                touched,
            },
        );
        storefront
    }

    pub async fn visitor_count(&self) -> usize {
        self.visitors.lock().await.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::{FixedCatalog, NoAuth};

    fn make() -> Storefront {
        Storefront::new(Arc::new(FixedCatalog::default()), Arc::new(NoAuth))
    }

    #[tokio::test]
    async fn each_visitor_gets_one_storefront() {
        let registry = VisitorRegistry::new(Duration::from_secs(60), 10);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let first = registry.get_or_create(a, make).await;
        let again = registry.get_or_create(a, make).await;
        let other = registry.get_or_create(b, make).await;

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(registry.visitor_count().await, 2);
    }

    #[tokio::test]
    async fn idle_visitors_are_swept_on_access() {
        let registry = VisitorRegistry::new(Duration::ZERO, 10);
        let a = Uuid::new_v4();

        registry.get_or_create(a, make).await;
        registry.get_or_create(Uuid::new_v4(), make).await;

        assert_eq!(registry.visitor_count().await, 1);
        assert!(registry.get(a).await.is_none());
    }

    #[tokio::test]
    async fn least_recently_seen_visitor_is_dropped_at_capacity() {
        let registry = VisitorRegistry::new(Duration::from_secs(60), 2);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        registry.get_or_create(a, make).await;
        registry.get_or_create(b, make).await;
        assert!(registry.get(a).await.is_some());
        registry.get_or_create(c, make).await;

        assert_eq!(registry.visitor_count().await, 2);
        assert!(registry.get(a).await.is_some());
        assert!(registry.get(b).await.is_none());
        assert!(registry.get(c).await.is_some());
    }

    #[tokio::test]
    async fn lookups_never_create() {
        let registry = VisitorRegistry::new(Duration::from_secs(60), 10);
        assert!(registry.get(Uuid::new_v4()).await.is_none());
        assert_eq!(registry.visitor_count().await, 0);
    }
}
