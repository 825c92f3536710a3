use std::sync::Arc;
use anyhow::Result;

use crate::config::Config;
use crate::mongo::Store;
use crate::pokepedia::{LocalDataset, RegionalIdCache, RegionalIdResolver, WikiClient};

pub mod routes;
pub mod handlers;

pub async fn start(config: Arc<Config>) -> Result<()> {
    let state = State::new(Arc::clone(&config)).await?;

    tracing::info!("listening at {}", config.web.host);
    warp::serve(routes::router(state)).run(config.web.host).await;
    Ok(())
}

pub struct State {
    pub config: Arc<Config>,
    pub store: Option<Store>,
    pub cache: Arc<RegionalIdCache>,
    pub resolver: RegionalIdResolver,
}

impl State {
    pub async fn new(config: Arc<Config>) -> Result<Arc<Self>> {
        let store = match &config.mongo {
            Some(mongo) => {
                let store = Store::connect(&mongo.url, &mongo.database).await?;
                store.ensure_indexes().await?;
                Some(store)
            }
            None => {
                tracing::warn!("mongo is not configured, trainer collections are unavailable");
                None
            }
        };

        let cache = Arc::new(RegionalIdCache::new());
        let resolver = RegionalIdResolver::new(
            WikiClient::new(&config.pokepedia)?,
            Arc::clone(&cache),
            LocalDataset::new(config.fallback.path.clone()),
        );

        Ok(Arc::new(Self {
            config,
            store,
            cache,
            resolver,
        }))
    }

    pub fn auth_configured(&self) -> bool {
        self.config
            .auth
            .as_ref()
            .map(|auth| !auth.secret.is_empty())
            .unwrap_or(false)
    }
}
