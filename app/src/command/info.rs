use aura_config::Config;
use aura_store::DatabaseMessageStore;
use tracing::info;

use super::{mask_database_url, mask_secret};

/// Strategy for displaying configuration information.
///
/// Prints every section with the API key masked and tests the database
/// connection.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== aura Configuration ===\n");

        println!("Persona:");
        println!("  Name: {}", config.persona.name);
        println!("  Instruction: {}", truncate(&config.persona.instruction, 60));
        println!();

        println!("Gemini:");
        println!("  API Key: {}", mask_secret(&config.providers.gemini.api_key));
        println!("  Model: {}", config.providers.gemini.model);
        if let Some(ref base_url) = config.providers.gemini.base_url {
            println!("  Base URL: {base_url}");
        }
        println!();

        println!("Database:");
        let db_url = &config.database.url;
        println!("  URL: {}", mask_database_url(db_url));

        info!("Testing database connection");
        match DatabaseMessageStore::connect(db_url).await {
            Ok(store) => {
                println!("  Status: Connected");
                store.close().await?;
            }
            Err(e) => {
                println!("  Status: Connection failed");
                println!("  Error: {e}");
            }
        }
        println!();

        let conversation = &config.conversation;
        println!("Conversation:");
        println!("  History Limit: {}", conversation.history_limit);
        println!(
            "  Generation Timeout: {}s",
            conversation.generation_timeout_secs
        );
        println!("  Serialize Writes: {}", conversation.serialize_writes);
        println!("  Mood History Limit: {}", conversation.mood_history_limit);
        println!();

        println!("Server:");
        println!("  Listen: {}:{}", config.server.host, config.server.port);

        Ok(())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{head}...")
    }
}
