//! `godchat serve` — Start the HTTP gateway server.

use godchat_config::AppConfig;

pub async fn run(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port {
        config.gateway.port = port;
    }

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  WARNING: No API key configured — completion calls will be rejected");
        eprintln!("  by the endpoint. Set OPENAI_API_KEY or GODCHAT_API_KEY, or add");
        eprintln!(
            "  api_key to {}.",
            AppConfig::config_dir().join("config.toml").display()
        );
        eprintln!();
    }

    println!("🕊️  GodChat gateway");
    println!("  Endpoint:   {}", config.api_url);
    println!("  Model:      {}", config.model);
    println!("  Transcript: {}", config.transcript.database_path().display());
    println!(
        "  Listening:  http://{}:{}",
        config.gateway.host, config.gateway.port
    );
    println!();

    godchat_gateway::start(config).await
}
