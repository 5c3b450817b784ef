use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

/// Rendered pages, each kept until its revalidation time.
pub struct ContentCache<T> {
    cache: Option<CacheMap<T>>,
}

type CacheMap<T> = HashMap<String, CacheValue<T>>;

pub enum Expire {
    Never,
    After(Duration),
}

struct CacheValue<T> {
    expire_date: DateTime<Utc>,
    value: Arc<T>,
}

impl<T> ContentCache<T> {
    pub fn new() -> Self {
        ContentCache {
            cache: Some(HashMap::new()),
        }
    }

    pub fn non_caching() -> Self {
        ContentCache {
            cache: None,
        }
    }

    fn add(&mut self, key: String, content: T, expire_after: Expire) -> Arc<T> {
        let value = Arc::new(content);
        if let Some(ref mut cache) = self.cache {
            let expire_date = match expire_after {
                Expire::Never => DateTime::<Utc>::MAX_UTC,
                Expire::After(duration) => Utc::now() + duration,
            };
            cache.insert(key, CacheValue {
                expire_date,
                value: value.clone(),
            });
        }
        value
    }

    /// `pages` is how many listing pages the entry holds.
    pub fn get_list(&self, pages: u32) -> Option<Arc<T>> {
        self.get(&format!("list-{}", pages))
    }

    pub fn add_list(&mut self, pages: u32, content: T, expire_after: Expire) -> Arc<T> {
        self.add(format!("list-{}", pages), content, expire_after)
    }

    pub fn get_post(&self, uid: &str) -> Option<Arc<T>> {
        self.get(&format!("post-{}", uid))
    }

    pub fn add_post(&mut self, uid: &str, content: T, expire_after: Expire) -> Arc<T> {
        self.add(format!("post-{}", uid), content, expire_after)
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let cache_value = self.cache.as_ref()?.get(key)?;
        if Utc::now() > cache_value.expire_date {
            return None;
        }
        Some(cache_value.value.clone())
    }

    /// Drops expired entries.
    pub fn purge(&mut self) -> usize {
        let Some(ref mut cache) = self.cache else {
            return 0;
        };
        let now = Utc::now();
        let before = cache.len();
        cache.retain(|_, v| v.expire_date >= now);
        before - cache.len()
    }
}

impl<T> Default for ContentCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
