//! Application wiring

use std::sync::Arc;

use config_core::ClientConfig;
use error_types::ClientResult;
use forum_api::ForumApi;
use session_store::{FileStore, KeyValueStore, SessionHandle, SessionStore};
use tokio::task::JoinHandle;
use tracing::info;

use crate::account::AccountService;
use crate::feed::FeedController;

/// Fully initialised client: session loaded, services sharing one API client
/// and one session handle.
pub struct ForumApp {
    pub config: ClientConfig,
    pub api: Arc<ForumApi>,
    pub session: SessionHandle,
    pub feed: Arc<FeedController>,
    pub accounts: AccountService,
    session_watch: JoinHandle<()>,
}

impl ForumApp {
    /// Build the app with the file store at the configured data directory
    pub async fn bootstrap(config: ClientConfig) -> ClientResult<Self> {
        let storage = Arc::new(FileStore::new(config.storage.data_dir.clone()));
        Self::with_storage(config, storage).await
    }

    /// Build the app on any key-value store
    pub async fn with_storage(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> ClientResult<Self> {
        let api = Arc::new(ForumApi::new(&config.api)?);

        // The session must be loaded before anything issues authenticated calls
        let session = SessionStore::new(storage);
        session.load_persisted_session().await;

        let feed = Arc::new(FeedController::new(api.clone(), session.clone()));
        let session_watch = feed.watch_session();
        let accounts = AccountService::new(api.clone(), session.clone());

        info!(
            environment = config.environment.as_str(),
            base_url = %api.base_url(),
            authenticated = session.is_authenticated(),
            "devsocial client ready"
        );

        Ok(Self {
            config,
            api,
            session,
            feed,
            accounts,
            session_watch,
        })
    }
}

impl Drop for ForumApp {
    fn drop(&mut self) {
        self.session_watch.abort();
    }
}
