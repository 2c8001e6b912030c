//! Terminal conversation command.
//!
//! Uses the same turn manager as the HTTP API, so terminal and web turns of
//! one conversation share a log.

use std::io::Write;

use aura_conversation::{TurnOutcome, TurnRequest};
use tracing::info;
use uuid::Uuid;

use super::init_components;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Conversation to continue (creates new if not provided)
    pub conversation: Option<String>,
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Emotion hint attached to every turn
    pub emotion: Option<String>,
    /// Keep messages in memory instead of the database
    pub ephemeral: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let components = init_components(input.ephemeral).await?;
        let turns = components.turns;

        let conversation_id = input
            .conversation
            .unwrap_or_else(|| Uuid::now_v7().to_string());
        let existing = turns.message_count(&conversation_id).await?;
        info!("Conversation {conversation_id}: {existing} messages so far");

        let request = |text: String| {
            TurnRequest::new(conversation_id.clone(), text).with_emotion(input.emotion.clone())
        };

        if let Some(msg) = input.message {
            let outcome = turns.take_turn(request(msg)).await?;
            print_outcome(&outcome);
            return Ok(());
        }

        println!(
            "{} is listening (conversation {conversation_id}). Type 'exit' to quit.\n",
            components.config.persona.name
        );

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            if std::io::stdin().read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();

            if line == "exit" {
                break;
            }
            if line.is_empty() {
                continue;
            }

            match turns.take_turn(request(line.to_string())).await {
                Ok(outcome) => print_outcome(&outcome),
                Err(e) => eprintln!("Error: {e}"),
            }
        }

        let total = turns.message_count(&conversation_id).await?;
        info!("Conversation ended: {total} total messages");
        Ok(())
    }
}

fn print_outcome(outcome: &TurnOutcome) {
    if let TurnOutcome::Fallback { error, .. } = outcome {
        eprintln!("(generation failed: {error})");
    }
    println!("\n{}\n", outcome.reply());
}
