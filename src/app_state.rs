//! Application context shared across consumers

use std::sync::Arc;

use crate::config::Config;
use crate::contract::SigningAgent;
use crate::notify::Notifier;
use crate::source::DataSource;

/// Dependency-injected application context.
///
/// Owns the notifier and the selected data source and is handed to
/// consumers explicitly; nothing in the crate reaches for ambient
/// global state.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub notifier: Notifier,
    pub source: Arc<DataSource>,
}

impl AppContext {
    pub fn new(config: Config, notifier: Notifier, source: DataSource) -> Self {
        Self {
            config,
            notifier,
            source: Arc::new(source),
        }
    }

    /// Build the full context from configuration and a signing agent
    pub fn from_config(config: Config, agent: Arc<dyn SigningAgent>) -> Self {
        let notifier = Notifier::new();
        let source = DataSource::from_config(&config, notifier.clone(), agent);
        Self::new(config, notifier, source)
    }
}
