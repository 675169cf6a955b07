mod rule_based;

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

pub use self::rule_based::RuleBasedEntityExtractor;
use crate::errors::*;
use crate::ontology::Entities;

pub trait EntityExtractor: Send + Sync {
    fn extract(&self, query: &str) -> Result<Entities>;
}

/// Entity extractor wrapper memoizing extraction results for repeated
/// queries, with a bounded LRU cache.
pub struct CachingEntityExtractor<E: EntityExtractor> {
    extractor: E,
    cache: Mutex<LruCache<String, Entities>>,
}

impl<E: EntityExtractor> CachingEntityExtractor<E> {
    pub fn new(extractor: E, cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            extractor,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl<E: EntityExtractor> EntityExtractor for CachingEntityExtractor<E> {
    fn extract(&self, query: &str) -> Result<Entities> {
        if let Some(cached) = self.cache.lock().unwrap().get(query) {
            return Ok(cached.clone());
        }
        let entities = self.extractor.extract(query)?;
        self.cache
            .lock()
            .unwrap()
            .put(query.to_string(), entities.clone());
        Ok(entities)
    }
}
