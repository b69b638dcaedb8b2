// Application context: everything the CLI needs, built once at startup
// and passed down explicitly.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::{Paths, Settings};
use crate::logging::Logger;
use crate::store::{CredentialStore, SqliteCredentialStore};
use crate::transport::{HttpTransport, Transport};

pub struct App<T, S> {
    pub settings: Settings,
    pub logger: Arc<dyn Logger>,
    pub client: ApiClient<T>,
    pub store: S,
}

impl<T: Transport, S: CredentialStore> App<T, S> {
    /// Wire the components together. The stored credential, if any, is
    /// loaded into the client.
    pub fn new(settings: Settings, logger: Arc<dyn Logger>, transport: T, store: S) -> Self {
        let credential = store.fetch();
        let client = ApiClient::new(&settings.api.base_url, credential, transport, logger.clone());
        App {
            settings,
            logger,
            client,
            store,
        }
    }
}

impl App<HttpTransport, SqliteCredentialStore> {
    /// Production wiring: reqwest transport and the SQLite store under `paths`.
    pub fn bootstrap(settings: Settings, paths: &Paths, logger: Arc<dyn Logger>) -> Result<Self> {
        let store = SqliteCredentialStore::open(&paths.database_file(), logger.clone())
            .context("Failed to open local database")?;
        let transport =
            HttpTransport::new(logger.clone()).context("Failed to build HTTP transport")?;
        Ok(App::new(settings, logger, transport, store))
    }
}
