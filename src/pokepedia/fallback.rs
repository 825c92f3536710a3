//! Bundled regional-ID dataset, keyed by national ID
//!
//! The JSON file is only read the first time a lookup needs it. A successful load
//! is kept for the life of the process. A failed load is retried on the next call.
//! Entries are read leniently: an unknown region key or an out-of-range number is
//! dropped with a warning, and the rest of the file still loads.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::region::{Region, RegionalIdMap};

pub struct LocalDataset {
    path: PathBuf,
    entries: OnceCell<HashMap<u32, RegionalIdMap>>,
}

impl LocalDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: OnceCell::new(),
        }
    }

    /// Dataset already in memory, never touching the filesystem.
    #[cfg(test)]
    pub fn from_entries(entries: HashMap<u32, RegionalIdMap>) -> Self {
        Self {
            path: PathBuf::new(),
            entries: OnceCell::new_with(Some(entries)),
        }
    }

    async fn entries(&self) -> anyhow::Result<&HashMap<u32, RegionalIdMap>> {
        self.entries
            .get_or_try_init(|| async {
                let json = tokio::fs::read_to_string(&self.path)
                    .await
                    .with_context(|| format!("could not read fallback dataset {}", self.path.display()))?;
                let raw: HashMap<String, Value> =
                    serde_json::from_str(&json).context("could not parse fallback dataset")?;
                let entries = read_entries(raw);
                tracing::info!(path = %self.path.display(), species = entries.len(), "loaded fallback dataset");
                Ok::<_, anyhow::Error>(entries)
            })
            .await
    }

    /// Entry for `national_id`; `Ok(None)` when the dataset has no such species.
    pub async fn lookup(&self, national_id: u32) -> anyhow::Result<Option<RegionalIdMap>> {
        Ok(self.entries().await?.get(&national_id).cloned())
    }
}

fn read_entries(raw: HashMap<String, Value>) -> HashMap<u32, RegionalIdMap> {
    raw.into_iter()
        .filter_map(|(key, entry)| {
            let national_id = match key.parse::<u32>() {
                Ok(id) if id > 0 => id,
                _ => {
                    tracing::warn!("skipping fallback entry with invalid national id {:?}", key);
                    return None;
                }
            };

            let fields = match entry {
                Value::Object(fields) => fields,
                other => {
                    tracing::warn!("skipping fallback entry #{}: expected an object, got {}", national_id, other);
                    return None;
                }
            };

            Some((national_id, read_regional_ids(national_id, fields)))
        })
        .collect()
}

fn read_regional_ids(national_id: u32, fields: serde_json::Map<String, Value>) -> RegionalIdMap {
    fields
        .into_iter()
        .filter_map(|(key, value)| {
            let region = match serde_json::from_value::<Region>(Value::String(key.clone())) {
                Ok(region) => region,
                Err(_) => {
                    tracing::warn!("fallback entry #{}: unknown region {:?}", national_id, key);
                    return None;
                }
            };

            match value.as_u64().and_then(|n| u16::try_from(n).ok()).filter(|&n| n > 0) {
                Some(number) => Some((region, number)),
                None => {
                    tracing::warn!("fallback entry #{}: invalid {} number {}", national_id, region, value);
                    None
                }
            }
        })
        .collect()
}
