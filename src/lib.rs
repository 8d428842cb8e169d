pub mod action;
mod controller;
mod error;
pub mod service;

#[derive(Debug, thiserror::Error)]
pub enum LogsError {
    #[error("invalid log directive: {0}")]
    InvalidDirective(#[from] tracing_subscriber::filter::ParseError),
    #[error("logs already initialized: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs the global subscriber. Unlike a lenient filter, a directive that
/// does not parse is reported instead of being skipped.
pub fn init_logs(directive: &str, color: bool) -> Result<(), LogsError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_new(directive)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(color))
        .try_init()?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn try_init_logs() {
    let level = std::env::var("LOG")
        .unwrap_or_else(|_| "app_creator=debug,app_creator_storage=debug,tower_http=debug".into());
    let _ = init_logs(&level, true);
}
