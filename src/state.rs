use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::web::render::{HtmlRenderer, PageRenderer};

/// Application wiring, built once at startup and passed to handlers through
/// axum state. Configuration lives here explicitly; nothing reads it
/// globally.
pub struct AppState {
    pub config: Config,

    pub store: Store,

    /// Rendering goes through an injected interface so handlers stay
    /// decoupled from the HTML implementation.
    pub renderer: Arc<dyn PageRenderer>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        tokio::fs::create_dir_all(config.uploads_dir()).await?;

        Ok(Arc::new(Self {
            config,
            store,
            renderer: Arc::new(HtmlRenderer),
        }))
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }
}
