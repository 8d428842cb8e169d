pub mod memory;
pub mod mongo;
pub mod retry;

use app_creator_prelude::Template;
use std::sync::Arc;

pub use retry::RetryPolicy;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("template store unavailable: {0}")]
    StoreUnavailable(#[source] BoxError),
    #[error("template store query failed: {0}")]
    StoreQueryFailed(#[source] BoxError),
    #[error("template {0:?} already exists")]
    DuplicateId(String),
}

impl Error {
    /// Only an unreachable store is worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::StoreQueryFailed(_) => "store_query_failed",
            Self::DuplicateId(_) => "duplicate_id",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("unable to read seed file: {0}")]
    SeedUnreadable(#[source] std::io::Error),
    #[error("unable to decode seed file: {0}")]
    SeedInvalid(#[source] app_creator_prelude::DecodeError),
    #[error("unable to configure mongodb client: {0}")]
    Connection(#[source] mongodb::error::Error),
}

/// Persistence capability used by the request handlers.
///
/// Implementations must be safe to call concurrently. Dropping a returned
/// future aborts the underlying call.
#[async_trait::async_trait]
pub trait TemplateStore: std::fmt::Debug + Send + Sync {
    /// Every stored template, in no particular order.
    async fn list_all(&self) -> Result<Vec<Template>, Error>;
    /// Inserts a template keyed by its id, failing with
    /// [`Error::DuplicateId`] when the id is already taken.
    async fn put(&self, template: Template) -> Result<(), Error>;
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BackendConfig {
    Memory(memory::Config),
    Mongo(mongo::Config),
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Memory(memory::Config::default())
    }
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Config {
    pub async fn build(self) -> Result<Storage, BuildError> {
        tracing::debug!("building template storage");
        let storage = match self.backend {
            BackendConfig::Memory(inner) => Storage::new(inner.build().await?),
            BackendConfig::Mongo(inner) => Storage::new(inner.build().await?),
        };
        Ok(storage.with_retry(self.retry))
    }
}

/// Shared handle over the configured [`TemplateStore`].
#[derive(Clone, Debug)]
pub struct Storage {
    inner: Arc<dyn TemplateStore>,
    retry: RetryPolicy,
}

impl Storage {
    pub fn new<S: TemplateStore + 'static>(store: S) -> Self {
        Self {
            inner: Arc::new(store),
            retry: RetryPolicy::disabled(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn list_all(&self) -> Result<Vec<Template>, Error> {
        self.retry
            .run("list_all", || self.inner.list_all())
            .await
            .inspect_err(track_error)
    }

    /// Inserts the template, retrying while the store is unreachable.
    ///
    /// An attempt reported as failed may still have been committed, so a
    /// [`Error::DuplicateId`] coming from a retry is accepted when the stored
    /// template is the submitted one.
    pub async fn put(&self, template: Template) -> Result<(), Error> {
        let mut attempts: u32 = 0;
        let result = self
            .retry
            .run("put", || {
                attempts += 1;
                self.inner.put(template.clone())
            })
            .await;
        match result {
            Err(Error::DuplicateId(id)) if attempts > 1 => self.reconcile(&template, id).await,
            other => other,
        }
        .inspect_err(track_error)
    }

    async fn reconcile(&self, template: &Template, id: String) -> Result<(), Error> {
        let stored = self.inner.list_all().await?;
        if stored.iter().any(|item| item == template) {
            tracing::debug!("template {id} was stored by an unacknowledged attempt");
            Ok(())
        } else {
            Err(Error::DuplicateId(id))
        }
    }
}

fn track_error(err: &Error) {
    metrics::counter!("storage_error", "reason" => err.reason()).increment(1);
}
