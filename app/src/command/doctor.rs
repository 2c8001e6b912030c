use std::time::Instant;

use aura_config::Config;
use aura_core::GenerationService;
use aura_store::DatabaseMessageStore;
use tracing::info;

use super::{build_provider, mask_database_url};

/// Strategy for connection diagnostics.
///
/// Checks the database and sends one throwaway prompt to Gemini. Nothing is
/// written to the message log.
#[derive(Debug, Clone, Copy)]
pub struct DoctorStrategy;

impl super::CommandStrategy for DoctorStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let mut healthy = true;

        println!("Database ({}):", mask_database_url(&config.database.url));
        match DatabaseMessageStore::connect(&config.database.url).await {
            Ok(store) => {
                match store.ping().await {
                    Ok(()) => println!("  ✅ Connected"),
                    Err(e) => {
                        healthy = false;
                        println!("  ❌ Ping failed: {e}");
                    }
                }
                store.close().await?;
            }
            Err(e) => {
                healthy = false;
                println!("  ❌ Connection failed: {e}");
            }
        }

        let provider = build_provider(&config);
        println!("Gemini ({}):", provider.model());
        info!("Sending test prompt to Gemini");
        let started = Instant::now();
        match provider.generate("", &[], "Say hello").await {
            Ok(generation) => println!(
                "  ✅ Replied in {}ms: {}",
                started.elapsed().as_millis(),
                generation.text.trim()
            ),
            Err(e) => {
                healthy = false;
                println!("  ❌ {} error: {e}", e.kind());
            }
        }

        if !healthy {
            anyhow::bail!("One or more checks failed");
        }
        Ok(())
    }
}
