//! Bounded memoization of walking-route lookups.
//!
//! Entries are keyed by the exact bit patterns of the four coordinates, so
//! two lookups share an entry only if their inputs are identical. Each entry
//! is a once-cell: concurrent callers asking for the same leg wait for the
//! first resolution instead of issuing their own request, while different
//! legs resolve independently.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::resolver::{RouteEstimate, WalkingRouteResolver};
use crate::traits::WalkingRouteProvider;

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

type CacheKey = [u64; 4];

fn cache_key(from: (f64, f64), to: (f64, f64)) -> CacheKey {
    [from.0.to_bits(), from.1.to_bits(), to.0.to_bits(), to.1.to_bits()]
}

#[derive(Debug)]
struct Slot {
    cell: Arc<OnceLock<RouteEstimate>>,
    last_used: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    slots: HashMap<CacheKey, Slot>,
    tick: u64,
}

impl CacheState {
    fn evict_least_recent(&mut self) {
        let oldest = self
            .slots
            .iter()
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(key, _)| *key);
        if let Some(key) = oldest {
            self.slots.remove(&key);
            tracing::debug!(?key, "evicted route cache entry");
        }
    }
}

/// Hit/miss counters for a [`RouteCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Least-recently-used cache of resolved legs, safe to share across threads.
#[derive(Debug)]
pub struct RouteCache {
    capacity: usize,
    state: Mutex<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl RouteCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Return the cached leg for `from -> to`, running `resolve` only when the
    /// key is not resident.
    pub fn get_or_insert_with<F>(&self, from: (f64, f64), to: (f64, f64), resolve: F) -> RouteEstimate
    where
        F: FnOnce() -> RouteEstimate,
    {
        let key = cache_key(from, to);
        let cell = {
            let mut state = self.lock();
            state.tick += 1;
            let tick = state.tick;
            if let Some(slot) = state.slots.get_mut(&key) {
                slot.last_used = tick;
                Arc::clone(&slot.cell)
            } else {
                if state.slots.len() >= self.capacity {
                    state.evict_least_recent();
                }
                let cell = Arc::new(OnceLock::new());
                state.slots.insert(
                    key,
                    Slot {
                        cell: Arc::clone(&cell),
                        last_used: tick,
                    },
                );
                cell
            }
        };

        // Resolution runs outside the map lock.
        let mut resolved_here = false;
        let estimate = cell.get_or_init(|| {
            resolved_here = true;
            resolve()
        });
        if resolved_here {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        estimate.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resolver fronted by a shared cache. This is the lookup context threaded
/// through the selector, loop builder and partitioner.
#[derive(Debug)]
pub struct RouteLookup<P> {
    resolver: WalkingRouteResolver<P>,
    cache: Arc<RouteCache>,
}

impl<P: WalkingRouteProvider> RouteLookup<P> {
    pub fn new(resolver: WalkingRouteResolver<P>, cache: Arc<RouteCache>) -> Self {
        Self { resolver, cache }
    }

    /// Lookup with its own default-sized cache.
    pub fn with_provider(provider: P) -> Self {
        Self::new(WalkingRouteResolver::new(provider), Arc::new(RouteCache::default()))
    }

    pub fn resolver(&self) -> &WalkingRouteResolver<P> {
        &self.resolver
    }

    pub fn cache(&self) -> &Arc<RouteCache> {
        &self.cache
    }

    pub fn route(&self, from: (f64, f64), to: (f64, f64)) -> RouteEstimate {
        self.cache
            .get_or_insert_with(from, to, || self.resolver.resolve(from, to))
    }
}
