//! Application context shared by every handler
//!
//! Owns the long-lived handles: the flow runner (and through it the model
//! provider), the locale catalog, the session signer, the view-state clock and
//! the blog store. The blog store is opened lazily on first use.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::OnceCell;

use crate::blog::{BlogStore, JsonFileStore};
use crate::config::MediSeekConfig;
use crate::error::Result;
use crate::flow::FlowRunner;
use crate::i18n::{Catalog, Language};
use crate::provider::{create_provider, Provider, UnavailableProvider};
use crate::session::SessionSigner;

/// Millisecond clock that never repeats a reading
///
/// Two reads within the same millisecond still yield increasing values, so
/// view-states can be ordered by timestamp.
#[derive(Debug, Default)]
pub struct Clock {
    last: AtomicU64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) -> u64 {
        let now = wall_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

fn wall_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub struct AppContext {
    config: MediSeekConfig,
    runner: FlowRunner,
    catalog: Catalog,
    signer: SessionSigner,
    clock: Clock,
    blog: OnceCell<Arc<dyn BlogStore>>,
}

impl AppContext {
    /// Build the context from configuration (provider chosen by config)
    pub fn init(config: MediSeekConfig) -> Result<Self> {
        let provider = create_provider(config.provider_name(), &config)?;
        Self::with_provider(config, provider)
    }

    /// Build the context for work that never calls the model
    ///
    /// A provider that cannot be built (missing key) is not an error here;
    /// flows run through this context fail with the reason instead.
    pub fn without_model(config: MediSeekConfig) -> Result<Self> {
        let provider: Arc<dyn Provider> = match create_provider(config.provider_name(), &config) {
            Ok(provider) => provider,
            Err(e) => Arc::new(UnavailableProvider::new(e.to_string())),
        };
        Self::with_provider(config, provider)
    }

    /// Build the context around an existing provider
    pub fn with_provider(config: MediSeekConfig, provider: Arc<dyn Provider>) -> Result<Self> {
        let runner = FlowRunner::new(provider)
            .with_model(config.ai.model.clone().unwrap_or_default())
            .with_temperature(config.ai.temperature)
            .with_max_tokens(config.ai.max_tokens);

        let signer = match config.admin.session_secret.as_deref() {
            Some(secret) => SessionSigner::new(secret, config.admin.session_max_age_secs)?,
            None => {
                tracing::debug!(
                    "No session secret configured; admin login is disabled until one is set"
                );
                SessionSigner::random(config.admin.session_max_age_secs)?
            }
        };

        tracing::debug!(
            provider = runner.provider_name(),
            model = runner.model(),
            language = config.app.default_language.code(),
            "Context initialized"
        );

        Ok(Self {
            runner,
            catalog: Catalog::builtin()?,
            signer,
            clock: Clock::new(),
            blog: OnceCell::new(),
            config,
        })
    }

    /// Use a specific blog store instead of the configured file
    pub fn with_blog_store(self, store: Arc<dyn BlogStore>) -> Self {
        if self.blog.set(store).is_err() {
            tracing::warn!("Blog store already opened; override ignored");
        }
        self
    }

    pub fn config(&self) -> &MediSeekConfig {
        &self.config
    }

    pub fn runner(&self) -> &FlowRunner {
        &self.runner
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn signer(&self) -> &SessionSigner {
        &self.signer
    }

    /// Language used when a submission names none
    pub fn default_language(&self) -> Language {
        self.config.app.default_language
    }

    /// Timestamp for the next view-state
    pub fn now(&self) -> u64 {
        self.clock.tick()
    }

    /// Blog store, opened on first use
    pub async fn blog(&self) -> Arc<dyn BlogStore> {
        let store = self
            .blog
            .get_or_init(|| async {
                let path = self.config.blog.data_path.clone();
                tracing::debug!(path = %path.display(), "Opening blog store");
                Arc::new(JsonFileStore::new(path)) as Arc<dyn BlogStore>
            })
            .await;
        Arc::clone(store)
    }

    /// Release shared handles
    pub async fn shutdown(self) {
        let opened = self.blog.initialized();
        drop(self.blog);
        tracing::info!(blog_store_opened = opened, "Context shut down");
    }
}
