//! In-memory regional-ID cache
//!
//! Keyed by the exact species name that was requested. Entries are never evicted:
//! there are only about a thousand species.
//!
//! Two concurrent lookups for the same uncached name may both reach Poképédia and
//! both store the result. The results are identical, so the last write wins.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::region::RegionalIdMap;

#[derive(Debug, Default)]
pub struct RegionalIdCache {
    entries: RwLock<HashMap<String, RegionalIdMap>>,
}

impl RegionalIdCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached map for `name`. An empty map is a valid cached "no numbers" result.
    pub async fn get(&self, name: &str) -> Option<RegionalIdMap> {
        self.entries.read().await.get(name).cloned()
    }

    /// Store `map` under `name`, replacing any previous entry.
    pub async fn put(&self, name: &str, map: RegionalIdMap) {
        self.entries.write().await.insert(name.to_owned(), map);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use maplit::btreemap;

    #[tokio::test]
    async fn put_then_get() {
        let cache = RegionalIdCache::new();
        assert_eq!(cache.get("Pikachu").await, None);

        cache.put("Pikachu", btreemap! { Region::Kanto => 25 }).await;
        assert_eq!(cache.get("Pikachu").await, Some(btreemap! { Region::Kanto => 25 }));
    }

    #[tokio::test]
    async fn empty_map_is_a_hit() {
        let cache = RegionalIdCache::new();
        cache.put("Missingno", RegionalIdMap::new()).await;
        assert_eq!(cache.get("Missingno").await, Some(RegionalIdMap::new()));
    }

    #[tokio::test]
    async fn keys_are_case_sensitive_and_overwritten() {
        let cache = RegionalIdCache::new();
        cache.put("Pikachu", btreemap! { Region::Kanto => 1 }).await;
        cache.put("Pikachu", btreemap! { Region::Kanto => 25 }).await;

        assert_eq!(cache.get("pikachu").await, None);
        assert_eq!(cache.get("Pikachu").await, Some(btreemap! { Region::Kanto => 25 }));
        assert_eq!(cache.len().await, 1);
    }
}
