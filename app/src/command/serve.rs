use aura_server::AppState;
use tracing::info;

use super::init_components;

#[derive(Debug, Clone)]
pub struct ServeInput {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Strategy for running the HTTP API.
///
/// The database connection and provider are built once here and shared by
/// every request through [`AppState`].
#[derive(Debug, Clone, Copy)]
pub struct ServeStrategy;

impl super::CommandStrategy for ServeStrategy {
    type Input = ServeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let components = init_components(false).await?;
        let server = &components.config.server;

        let host = input.host.unwrap_or_else(|| server.host.clone());
        let port = input.port.unwrap_or(server.port);
        info!(
            "Starting server for persona {} on {host}:{port}",
            components.config.persona.name
        );

        let listener = aura_server::bind(&host, port).await?;
        aura_server::serve(listener, AppState::new(components.turns)).await?;
        Ok(())
    }
}
