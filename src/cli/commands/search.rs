//! Search command handler

use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::search::{Collection, ContentSource, SearchRequest, SearchService, Visibility};

pub async fn cmd_search(
    config: &Config,
    query: &str,
    kind: Option<&str>,
    limit: Option<u64>,
    drafts: bool,
) -> anyhow::Result<()> {
    let kind = kind.map(str::parse::<Collection>).transpose()?;

    let store = Store::new(&config.general.database_path).await?;
    let source: Arc<dyn ContentSource> = Arc::new(store);
    let service = SearchService::with_default_cache(source, config.search.clone());

    let reply = service
        .search(SearchRequest {
            query: query.to_string(),
            kind,
            limit,
            visibility: if drafts {
                Visibility::Privileged
            } else {
                Visibility::Public
            },
        })
        .await?;

    println!("{}", reply.body);
    Ok(())
}
