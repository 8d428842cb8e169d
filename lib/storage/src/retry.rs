use crate::Error;
use backoff::ExponentialBackoffBuilder;
use std::future::Future;
use std::time::Duration;

/// Bounded exponential backoff applied to [`Error::StoreUnavailable`].
///
/// Durations are expressed in milliseconds. A `max_elapsed_time` of zero
/// disables retrying altogether.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "RetryPolicy::default_initial_interval")]
    pub initial_interval: u64,
    #[serde(default = "RetryPolicy::default_max_elapsed_time")]
    pub max_elapsed_time: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Self::default_initial_interval(),
            max_elapsed_time: Self::default_max_elapsed_time(),
        }
    }
}

impl RetryPolicy {
    fn default_initial_interval() -> u64 {
        100
    }

    fn default_max_elapsed_time() -> u64 {
        2000
    }

    pub fn disabled() -> Self {
        Self {
            max_elapsed_time: 0,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_elapsed_time > 0
    }

    pub(crate) async fn run<T, F, Fut>(
        &self,
        operation: &'static str,
        mut func: F,
    ) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        if !self.is_enabled() {
            return func().await;
        }
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.initial_interval))
            .with_max_elapsed_time(Some(Duration::from_millis(self.max_elapsed_time)))
            .build();
        backoff::future::retry(policy, || {
            let attempt = func();
            async move {
                attempt.await.map_err(|err| {
                    if err.is_transient() {
                        tracing::warn!("storage {operation} failed, retrying: {err}");
                        backoff::Error::transient(err)
                    } else {
                        backoff::Error::permanent(err)
                    }
                })
            }
        })
        .await
    }
}
