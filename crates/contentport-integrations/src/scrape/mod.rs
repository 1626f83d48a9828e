pub mod firecrawl;

pub use firecrawl::{FirecrawlClient, ScrapedPage, WebScraper, FIRECRAWL_API_BASE};
