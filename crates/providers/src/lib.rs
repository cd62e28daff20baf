//! Completion endpoint clients for GodChat.
//!
//! One implementation covers the vast majority of providers, since most
//! expose an OpenAI-compatible `/v1/chat/completions` endpoint.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatClient;

use godchat_config::AppConfig;

/// Build the completion client from application configuration.
///
/// The client is constructed once per process and injected — model,
/// temperature, and credentials are fixed at construction time.
pub fn build_from_config(config: &AppConfig) -> OpenAiCompatClient {
    let mut client = OpenAiCompatClient::new(
        "openai",
        &config.api_url,
        config.api_key.clone().unwrap_or_default(),
        &config.model,
    )
    .with_temperature(config.temperature);

    if let Some(max_tokens) = config.max_tokens {
        client = client.with_max_tokens(max_tokens);
    }

    client
}
