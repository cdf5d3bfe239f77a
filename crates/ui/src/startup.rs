use std::path::Path;
use std::sync::Arc;

use chatbot_core::{AppConfig, SessionTokenStore};
use chatbot_storage::{FileStore, KeyValueStore, MemoryStore};
use chatbot_transport::{HttpTransport, TransportConfig, TransportError};
use snafu::{ResultExt, Snafu};
use tracing_subscriber::EnvFilter;

use crate::chat::ChatServices;

pub const DEFAULT_LOG_FILTER: &str = "info";

pub type StartupResult<T> = Result<T, StartupError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StartupError {
    #[snafu(display("backend transport is unusable on `{stage}`: {source}"))]
    Transport {
        stage: &'static str,
        source: TransportError,
    },
}

/// Installs the fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Opens local storage at `path`, degrading to an in-memory store when the
/// file cannot be read.
pub fn open_local_storage(path: &Path) -> Arc<dyn KeyValueStore> {
    match FileStore::open(path) {
        Ok(store) => {
            tracing::info!("using local storage at {:?}", store.path());
            Arc::new(store)
        }
        Err(error) => {
            tracing::warn!(
                "failed to open local storage at {:?}: {}. session token will not persist",
                path,
                error
            );
            Arc::new(MemoryStore::new())
        }
    }
}

pub fn build_services(config: &AppConfig) -> StartupResult<ChatServices> {
    let transport_config = TransportConfig::new(&config.backend_url).context(TransportSnafu {
        stage: "parse-backend-url",
    })?;
    let transport = HttpTransport::new(transport_config).context(TransportSnafu {
        stage: "build-http-transport",
    })?;
    tracing::info!(backend = %transport.config().base_url(), "chat backend configured");

    let storage = open_local_storage(&config.storage_path());

    Ok(ChatServices {
        transport: Arc::new(transport),
        tokens: SessionTokenStore::new(storage),
        reveal_interval: config.reveal_interval(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chatbot_core::SESSION_TOKEN_KEY;
    use chatbot_transport::SessionToken;

    use super::*;

    fn config_in(dir: &Path, backend_url: &str) -> AppConfig {
        AppConfig {
            backend_url: backend_url.to_string(),
            reveal_interval_ms: 15,
            storage_path: Some(dir.join("local-storage.json")),
            ..AppConfig::default()
        }
    }

    #[test]
    fn services_persist_tokens_to_configured_storage() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "http://127.0.0.1:8000");

        let services = build_services(&config).unwrap();
        services
            .tokens
            .save(&SessionToken::new("s1").unwrap())
            .unwrap();

        assert_eq!(services.reveal_interval, Duration::from_millis(15));
        let reopened = FileStore::open(dir.path().join("local-storage.json")).unwrap();
        assert_eq!(reopened.get(SESSION_TOKEN_KEY).unwrap().as_deref(), Some("s1"));
    }

    #[test]
    fn invalid_backend_url_is_a_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "::not-a-url::");

        let error = build_services(&config).err();

        assert!(matches!(
            error,
            Some(StartupError::Transport {
                stage: "parse-backend-url",
                ..
            })
        ));
    }

    #[test]
    fn unreadable_storage_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();

        // A directory cannot be read as a storage file.
        let storage = open_local_storage(dir.path());
        storage.set(SESSION_TOKEN_KEY, "s1").unwrap();

        assert_eq!(storage.get(SESSION_TOKEN_KEY).unwrap().as_deref(), Some("s1"));
    }
}
