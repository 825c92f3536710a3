//! Regional-ID resolution: cache, then Poképédia, then the bundled dataset
//!
//! Nothing here returns an error. Lookups that fail are logged and come back as
//! `None` (remote) or an empty map (full resolution).

use std::sync::Arc;

use super::cache::RegionalIdCache;
use super::client::WikiClient;
use super::fallback::LocalDataset;
use super::parser::parse_regional_ids;
use crate::region::RegionalIdMap;

pub struct RegionalIdResolver {
    client: WikiClient,
    cache: Arc<RegionalIdCache>,
    fallback: LocalDataset,
}

impl RegionalIdResolver {
    pub fn new(client: WikiClient, cache: Arc<RegionalIdCache>, fallback: LocalDataset) -> Self {
        Self {
            client,
            cache,
            fallback,
        }
    }

    /// Regional numbers from the cache or Poképédia.
    ///
    /// `None` means no data could be obtained. `Some` with an empty map means the
    /// page was read but listed no regional numbers; that result is cached too.
    pub async fn fetch_regional_ids(&self, species: &str) -> Option<RegionalIdMap> {
        if let Some(cached) = self.cache.get(species).await {
            return Some(cached);
        }

        let wikitext = match self.client.fetch_wikitext(species).await {
            Ok(Some(wikitext)) => wikitext,
            Ok(None) => {
                tracing::warn!("Pokémon {} not found on Poképédia", species);
                return None;
            }
            Err(e) => {
                tracing::warn!("Poképédia lookup for {} failed: {:#}", species, e);
                return None;
            }
        };

        let ids = parse_regional_ids(&wikitext, species);
        self.cache.put(species, ids.clone()).await;

        Some(ids)
    }

    /// Regional numbers for a species, falling back to the bundled dataset.
    ///
    /// A non-empty remote result is returned as is, even when the dataset knows
    /// more regions. The two sources are never merged.
    pub async fn get_regional_ids(&self, national_id: u32, species: &str) -> RegionalIdMap {
        if let Some(ids) = self.fetch_regional_ids(species).await {
            if !ids.is_empty() {
                return ids;
            }
        }

        match self.fallback.lookup(national_id).await {
            Ok(ids) => ids.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("fallback dataset unavailable for #{}: {:#}", national_id, e);
                RegionalIdMap::new()
            }
        }
    }
}
