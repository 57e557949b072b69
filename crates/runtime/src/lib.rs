use std::sync::Arc;

use anyhow::{Context, Result};
use huddle_api::{ApiClient, ChatApi};
use huddle_cache::{open_store, CacheStore};
use huddle_chats::AuthResponse;
use huddle_config::AppConfig;
use huddle_session::{Session, SessionContext, SessionHandle};
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Long-lived pieces shared by every command: configuration, the durable
/// cache and an unauthenticated REST client.
#[derive(Clone)]
pub struct ClientServices {
    pub config: AppConfig,
    pub cache: Arc<dyn CacheStore>,
    pub api: ApiClient,
}

impl ClientServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let cache = open_store(&config.cache)
            .await
            .with_context(|| format!("failed to open message cache at {}", config.cache.url))?;
        let api = ApiClient::new(&config.api).context("failed to build http client")?;

        info!(api = %config.api.base_url, cache = %config.cache.url, "client services ready");

        Ok(Self {
            config: config.clone(),
            cache,
            api,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.api
            .login(email, password)
            .await
            .context("login failed")
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthResponse> {
        self.api
            .register(username, email, password)
            .await
            .context("registration failed")
    }

    /// Client authenticated with `token`
    pub fn authorized(&self, token: &str) -> ApiClient {
        self.api.clone().with_token(token)
    }

    /// Resolve the user behind a stored token.
    ///
    /// A rejected token means the stored login has expired; the caller is
    /// expected to discard it.
    pub async fn resume(&self, token: &str) -> Result<SessionContext> {
        let user = match self.authorized(token).profile().await {
            Ok(user) => user,
            Err(error) => {
                warn!(%error, "stored token rejected");
                return Err(anyhow::Error::new(error).context("session expired, please log in again"));
            }
        };

        info!(user_id = %user.id, username = %user.username, "session resumed");
        Ok(SessionContext::new(token, user, self.cache.clone()))
    }

    pub fn start_session(&self, context: SessionContext) -> Result<SessionHandle> {
        Session::connect(context, &self.config).context("failed to start session")
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
