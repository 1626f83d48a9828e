use std::sync::Arc;

use contentport_api::{build_router, config::Config, init_logging, state::AppState};
use contentport_graph::Graph;
use contentport_integrations::{
    FirecrawlClient, ObjectStorage, S3Client, S3Config, TwitterApi, TwitterConfig,
    TwitterHttpClient, WebScraper,
};
use contentport_llm::{ClientFactory, ProviderConfig};
use contentport_persist::StoreBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Contentport API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    tracing::info!("Initializing LLM client");
    let mut provider = ProviderConfig::openrouter(config.openrouter_api_key.clone());
    if !config.server.app_url.is_empty() {
        provider = provider.with_attribution(config.server.app_url.clone(), "Contentport");
    }
    let llm_client = ClientFactory::create_chat_client(provider)?;

    tracing::info!("Connecting to stores");
    let stores = StoreBuilder::new()
        .mongodb_uri(&config.mongodb_uri)
        .database(&config.mongodb.database)
        .in_memory(config.mongodb.in_memory)
        .build()
        .await?;

    let storage: Arc<dyn ObjectStorage> = Arc::new(S3Client::new(S3Config {
        bucket: config.s3.bucket.clone(),
        region: config.s3.region.clone(),
        access_key_id: config.aws_access_key_id.clone(),
        secret_access_key: config.aws_secret_access_key.clone(),
        endpoint: config.s3.endpoint.clone(),
    })?);
    let twitter: Arc<dyn TwitterApi> = Arc::new(TwitterHttpClient::new(TwitterConfig::new(
        config.twitter_consumer_key.clone(),
        config.twitter_consumer_secret.clone(),
        config.twitter_bearer_token.clone(),
    ))?);
    let scraper: Arc<dyn WebScraper> = Arc::new(FirecrawlClient::new(config.firecrawl_api_key.clone())?);

    let graph = Graph::builder()
        .llm_client(llm_client.clone())
        .config((&config.graph).into())
        .build()?;

    let state = Arc::new(AppState::new(
        config.clone(),
        stores,
        storage,
        twitter,
        scraper,
        llm_client,
        graph,
    ));

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
