//! `godchat history` — Inspect the persisted transcript.

use godchat_config::AppConfig;
use godchat_core::store::TranscriptStore;
use godchat_core::turn::SessionId;
use godchat_transcript::SqliteTranscript;

pub async fn run(
    session: Option<String>,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let db_path = config.transcript.database_path();
    if !db_path.exists() {
        println!("📜 No transcript yet at {}", db_path.display());
        return Ok(());
    }

    let store = SqliteTranscript::new(&format!("sqlite://{}", db_path.display())).await?;

    let turns = match &session {
        Some(sid) => store.history(&SessionId::from(sid), limit).await?,
        None => store.tail(limit).await?,
    };

    match &session {
        Some(sid) => println!("📜 Transcript for session {sid} ({} turns)", turns.len()),
        None => println!("📜 Transcript — most recent {} turns", turns.len()),
    }
    println!();

    if turns.is_empty() {
        println!("  (empty)");
        return Ok(());
    }

    for turn in &turns {
        println!(
            "  [{}] {:<9} {}",
            turn.created_at.format("%Y-%m-%d %H:%M:%S"),
            turn.role.to_string(),
            turn.content
        );
        if session.is_none() {
            println!("             session: {}", turn.session_id);
        }
    }

    Ok(())
}
