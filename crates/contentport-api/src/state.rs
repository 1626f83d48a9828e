use std::sync::Arc;

use contentport_graph::Graph;
use contentport_integrations::{ObjectStorage, TwitterApi, WebScraper};
use contentport_llm::ChatClient;
use contentport_persist::{
    AccountRepository, ChatHistoryRepository, KeyValueStore, MediaUploadRepository, RecordStore,
    Stores, StyleRepository, WebsiteContentRepository,
};

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// Every client sits behind a trait object so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub records: Arc<dyn RecordStore>,
    pub kv: Arc<dyn KeyValueStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub twitter: Arc<dyn TwitterApi>,
    pub scraper: Arc<dyn WebScraper>,
    pub llm_client: Arc<dyn ChatClient>,
    pub graph: Arc<Graph>,
}

impl AppState {
    pub fn new(
        config: Config,
        stores: Stores,
        storage: Arc<dyn ObjectStorage>,
        twitter: Arc<dyn TwitterApi>,
        scraper: Arc<dyn WebScraper>,
        llm_client: Arc<dyn ChatClient>,
        graph: Graph,
    ) -> Self {
        Self {
            config: Arc::new(config),
            records: stores.records,
            kv: stores.kv,
            storage,
            twitter,
            scraper,
            llm_client,
            graph: Arc::new(graph),
        }
    }

    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::new(self.kv.clone())
    }

    pub fn chats(&self) -> ChatHistoryRepository {
        ChatHistoryRepository::new(self.kv.clone())
    }

    pub fn styles(&self) -> StyleRepository {
        StyleRepository::new(self.kv.clone())
    }

    pub fn media_uploads(&self) -> MediaUploadRepository {
        MediaUploadRepository::new(self.kv.clone())
    }

    pub fn websites(&self) -> WebsiteContentRepository {
        WebsiteContentRepository::new(self.kv.clone())
    }
}
