//! Seed-keyed engine registry with least-recently-used eviction.
//!
//! Created once at process start from [`Settings`] and cleared by
//! [`EngineRegistry::reconfigure`]. `get_or_create` hands out `&mut Engine`,
//! so a registry owner is the single writer for every engine it holds.

use crate::engine::Engine;
use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use tracing::info;
use valore_env::Settings;

/// Bounded map from seed (or "no seed") to engine.
#[derive(Debug)]
pub struct EngineRegistry {
    capacity: usize,

    engines: HashMap<Option<u64>, Engine>,

    /// Least recently used first
    order: VecDeque<Option<u64>>,
}

impl EngineRegistry {
    /// Creates an empty registry holding at most `capacity` engines.
    pub fn new(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        Self {
            capacity,
            engines: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.registry_capacity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Returns the engine for `seed`, building it if needed. Marks it most
    /// recently used and evicts the least recently used engine when full.
    pub fn get_or_create(&mut self, seed: Option<u64>) -> &mut Engine {
        if self.engines.contains_key(&seed) {
            self.touch(seed);
        } else {
            while self.engines.len() >= self.capacity {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.engines.remove(&oldest);
                info!(seed = ?oldest, "Evicted synthetic engine");
            }
            self.order.push_back(seed);
        }
        self.engines.entry(seed).or_insert_with(|| Engine::new(seed))
    }

    /// Looks up an engine without building it or refreshing its recency.
    pub fn get(&self, seed: Option<u64>) -> Option<&Engine> {
        self.engines.get(&seed)
    }

    pub fn contains(&self, seed: Option<u64>) -> bool {
        self.engines.contains_key(&seed)
    }

    /// Drops every engine.
    pub fn clear(&mut self) {
        self.engines.clear();
        self.order.clear();
    }

    /// Drops every engine and adopts the new capacity.
    pub fn reconfigure(&mut self, settings: &Settings) {
        self.clear();
        self.capacity = settings.registry_capacity.get();
        info!(capacity = self.capacity, "Engine registry reconfigured");
    }

    fn touch(&mut self, seed: Option<u64>) {
        if let Some(position) = self.order.iter().position(|s| *s == seed) {
            self.order.remove(position);
        }
        self.order.push_back(seed);
    }
}
