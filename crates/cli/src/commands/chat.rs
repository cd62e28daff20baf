//! `godchat chat` — Interactive or single-message chat mode.
//!
//! Interactive mode mirrors the web client's behavior: it keeps a small
//! short-term buffer of the most recent turns and sends it along as
//! `client_memory` with every request.

use std::io::{BufRead, Write};
use std::sync::Arc;

use godchat_config::AppConfig;
use godchat_core::store::TranscriptStore;
use godchat_core::turn::IncomingTurn;
use godchat_orchestrator::{ChatOrchestrator, ChatRequest, ContextAssembler};

/// How many recent turns the client-side buffer carries, matching the
/// web client's short-term memory window.
const CLIENT_MEMORY_WINDOW: usize = 5;

pub async fn run(
    message: Option<String>,
    session: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export GODCHAT_API_KEY='sk-...'");
        eprintln!("    export OPENAI_API_KEY='sk-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let orchestrator = build_orchestrator(&config).await?;
    let session_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let reply = orchestrator
            .handle(ChatRequest {
                session_id,
                turns: vec![IncomingTurn::user(msg)],
                client_memory: vec![],
            })
            .await?;
        eprint!("\r              \r");
        println!("{}", reply.content);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  🕊️  GodChat — Interactive Mode");
    println!("  Endpoint: {}", config.api_url);
    println!("  Model:    {}", config.model);
    println!("  Session:  {session_id}");
    println!();
    println!("  Type a message and press Enter. Ctrl-D to quit.");
    println!();

    let stdin = std::io::stdin();
    let mut client_memory: Vec<IncomingTurn> = Vec::new();

    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let result = orchestrator
            .handle(ChatRequest {
                session_id: session_id.clone(),
                turns: vec![IncomingTurn::user(input)],
                client_memory: client_memory.clone(),
            })
            .await;

        match result {
            Ok(reply) => {
                println!("god> {}", reply.content);
                println!();

                client_memory.push(IncomingTurn::user(input));
                client_memory.push(IncomingTurn::assistant(&reply.content));
                let excess = client_memory.len().saturating_sub(CLIENT_MEMORY_WINDOW);
                client_memory.drain(..excess);
            }
            Err(e) => {
                eprintln!("  ❌ {e}");
                eprintln!();
            }
        }
    }

    Ok(())
}

async fn build_orchestrator(
    config: &AppConfig,
) -> Result<ChatOrchestrator, Box<dyn std::error::Error>> {
    let db_path = config.transcript.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let store: Arc<dyn TranscriptStore> = Arc::new(
        godchat_transcript::SqliteTranscript::new(&format!("sqlite://{}", db_path.display()))
            .await?,
    );
    let completion = Arc::new(godchat_providers::build_from_config(config));

    Ok(ChatOrchestrator::new(
        store,
        completion,
        ContextAssembler::from_config(config),
    ))
}
