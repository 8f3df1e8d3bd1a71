use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::search::{ContentSource, SearchService};

/// Long-lived services shared by the HTTP API and the CLI.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub search_service: Arc<SearchService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let source: Arc<dyn ContentSource> = Arc::new(store.clone());
        let search_service = Arc::new(SearchService::with_default_cache(
            source,
            config.search.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            search_service,
        })
    }
}
