//! The controller runtime: wires schema initialisation, the election
//! loop, and the HTTP gateway together, then drives them until shutdown.

use std::sync::Arc;

use dspu_core::config::Config;
use dspu_core::error::{DspuError, Result};
use dspu_runtime::election::{ElectionConfig, ElectionHandle, ElectionLoop};
use dspu_runtime::gateway::{GatewayConfig, GatewayServer};
use dspu_runtime::shutdown::{GracefulShutdown, ShutdownConfig};
use dspu_runtime::{schema, Database};

/// Prelude module for common imports.
pub mod prelude {
    pub use dspu_core::cluster::{NodeId, Role, RoleState};
    pub use dspu_core::config::Config;
    pub use dspu_core::error::{DspuError, Result};

    pub use crate::{Controller, ControllerBuilder};
}

/// The controller process. Construct via [`Controller::builder`].
pub struct Controller {
    config: Config,
}

impl Controller {
    /// Start a new builder.
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run until a shutdown signal is received.
    ///
    /// Sequence: schema init (fatal on timeout) → pooled DB connection for
    /// the gateway → election loop spawned on its own task → HTTP gateway
    /// spawned on its own task, sharing the one [`GracefulShutdown`] that
    /// both tracks its in-flight requests and later drains them → wait for
    /// Ctrl-C → bounded drain → release the election lock and close
    /// connections.
    pub async fn run(self) -> Result<()> {
        tracing::info!(node_id = %self.config.node_id, "dspu controller starting");

        let db = Database::connect(&self.config.database_url).await?;
        tracing::info!("connected to backing store");

        schema::ensure_schema_with_retry(
            db.pool(),
            self.config.schema_retry_deadline,
            self.config.schema_retry_interval,
        )
        .await?;
        tracing::info!("schema ensured");

        let election_config = ElectionConfig::new(
            self.config.node_id.clone(),
            self.config.leader_lock_key,
            self.config.leader_poll,
        );
        let join_timeout = election_config.join_timeout;
        let (election_loop, election_handle) =
            ElectionLoop::new(self.config.database_url.clone(), election_config);

        let election_task = tokio::spawn(election_loop.run());

        let shutdown = Arc::new(GracefulShutdown::new(ShutdownConfig::default()));

        let gateway = GatewayServer::new(
            GatewayConfig {
                port: self.config.port,
                leader_url: self.config.leader_url.clone(),
            },
            election_handle.clone(),
            shutdown.clone(),
        );

        let gateway_task = tokio::spawn(async move {
            if let Err(e) = gateway.run().await {
                tracing::error!(error = %e, "gateway server exited with error");
            }
        });

        wait_for_shutdown_signal().await;
        tracing::info!("shutdown signal received, draining");

        shutdown.drain().await;

        election_handle.stop();
        gateway_task.abort();

        if tokio::time::timeout(join_timeout, election_task)
            .await
            .is_err()
        {
            tracing::warn!("election loop did not stop within the join window");
        }

        db.close().await;
        tracing::info!("dspu controller stopped");
        Ok(())
    }
}

async fn wait_for_shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {}
        Err(e) => tracing::warn!(error = %e, "failed to listen for ctrl-c"),
    }
}

/// Builder for [`Controller`].
#[derive(Default)]
pub struct ControllerBuilder {
    config: Option<Config>,
}

impl ControllerBuilder {
    pub fn new() -> Self {
        Self { config: None }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<Controller> {
        let config = self
            .config
            .ok_or_else(|| DspuError::Config("configuration is required".to_string()))?;
        Ok(Controller { config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        std::env::set_var("DATABASE_URL", "postgres://localhost/dspu_test_placeholder");
        let config = Config::from_env().unwrap();
        std::env::remove_var("DATABASE_URL");
        config
    }

    #[test]
    fn builder_requires_config() {
        let result = ControllerBuilder::new().build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_with_config_succeeds() {
        let result = ControllerBuilder::new().config(test_config()).build();
        assert!(result.is_ok());
    }
}
