mod client;

pub use client::{OpenRouterClient, OpenRouterClientBuilder, OPENROUTER_API_BASE};
