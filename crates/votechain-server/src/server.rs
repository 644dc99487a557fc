use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use votechain_crypto::EntryHasher;
use votechain_ledger::{Ledger, SharedLedger};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::journal::JournalVoterStore;
use crate::router::build_router;
use crate::state::{AppState, VotePolicy};
use crate::store::{InMemoryVoterStore, VoterStore};

/// Vote ledger HTTP server.
pub struct VoteServer {
    config: ServerConfig,
}

impl VoteServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Fresh ledger plus the configured voter store.
    pub async fn build_state(&self) -> ServerResult<AppState> {
        let ledger = Ledger::with_hasher(EntryHasher::new(self.config.digest))?;
        info!(
            digest = %self.config.digest,
            genesis = %ledger.genesis().commitment().short_hex(),
            "ledger initialized"
        );

        let voters: Arc<dyn VoterStore> = match &self.config.voter_store {
            Some(path) => {
                let journal = JournalVoterStore::open(path).await?;
                info!(path = %journal.path().display(), "using voter journal");
                Arc::new(journal)
            }
            None => Arc::new(InMemoryVoterStore::new()),
        };

        Ok(AppState::new(
            SharedLedger::new(ledger),
            voters,
            VotePolicy::from_config(&self.config),
        ))
    }

    /// Build the router (useful for testing).
    pub async fn router(&self) -> ServerResult<axum::Router> {
        Ok(build_router(self.build_state().await?, self.config.cors))
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router().await?;
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("votechain server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(tokio::signal::ctrl_c()))
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

/// Resolves when `signal` fires. If the signal cannot be listened for, the
/// error is logged and this never resolves.
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("shutting down"),
        Err(e) => {
            error!(error = %e, "cannot listen for shutdown signal; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
