use crate::controller::TEMPLATES_PATH;
use app_creator_storage::Storage;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use metrics_exporter_prometheus::{
    BuildError as MetricsError, PrometheusBuilder, PrometheusHandle,
};
use serde::{Deserialize, Deserializer};
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to load configuration: {0}")]
    Configuration(#[from] config::ConfigError),
    #[error("unable to build storage: {0}")]
    Storage(#[from] app_creator_storage::BuildError),
    #[error("unable to install prometheus recorder: {0}")]
    Metrics(#[from] MetricsError),
    #[error("unable to bind {0}: {1}")]
    Bind(SocketAddr, #[source] std::io::Error),
    #[error("server failed: {0}")]
    Serve(#[from] std::io::Error),
    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Configuration {
    #[serde(default = "Configuration::default_host")]
    pub host: IpAddr,
    #[serde(
        default = "Configuration::default_port",
        deserialize_with = "deserialize_port"
    )]
    pub port: u16,
    /// Origins allowed to call the api from a browser, either a list or a
    /// comma separated string. `*` allows any origin, nothing disables CORS.
    #[serde(default, deserialize_with = "deserialize_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "Configuration::default_static_path")]
    pub static_path: PathBuf,
    /// Maximum duration of a request, in milliseconds. A request running
    /// longer is dropped, store call included, and answered with a 500 like
    /// any other store fault.
    #[serde(default = "Configuration::default_request_timeout")]
    pub request_timeout: u64,
    /// Grace period for in-flight requests on shutdown, in seconds.
    #[serde(default = "Configuration::default_shutdown_timeout")]
    pub shutdown_timeout: u64,
    /// Header carrying a request identifier added to the request spans.
    #[serde(default)]
    pub trace_header: Option<String>,
    #[serde(default)]
    pub storage: app_creator_storage::Config,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            allowed_origins: Vec::new(),
            static_path: Self::default_static_path(),
            request_timeout: Self::default_request_timeout(),
            shutdown_timeout: Self::default_shutdown_timeout(),
            trace_header: None,
            storage: Default::default(),
        }
    }
}

impl Configuration {
    fn default_host() -> IpAddr {
        IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_static_path() -> PathBuf {
        PathBuf::from("static")
    }

    fn default_request_timeout() -> u64 {
        10_000
    }

    fn default_shutdown_timeout() -> u64 {
        30
    }

    fn address(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }

    pub fn from_path(path: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::default().separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Accepts `8080` as well as `":8080"`, anything else falls back to the
/// default port.
pub(crate) fn parse_port(input: &str) -> Option<u16> {
    let input = input.trim();
    let digits = input.strip_prefix(':').unwrap_or(input);
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn deserialize_port<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Number(u16),
        Text(String),
    }

    Ok(match PortValue::deserialize(deserializer)? {
        PortValue::Number(port) => port,
        PortValue::Text(text) => parse_port(&text).unwrap_or_else(|| {
            let port = Configuration::default_port();
            tracing::warn!("invalid port {text:?}, defaulting to {port}");
            port
        }),
    })
}

fn deserialize_origins<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OriginsValue {
        Many(Vec<String>),
        Joined(String),
    }

    let values = match OriginsValue::deserialize(deserializer)? {
        OriginsValue::Many(list) => list,
        OriginsValue::Joined(text) => text.split(',').map(String::from).collect(),
    };
    Ok(values
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    let allow_origin = if origins.iter().any(|item| item == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|item| {
            item.parse::<HeaderValue>()
                .inspect_err(|err| tracing::error!("invalid CORS origin {item:?}: {err}"))
                .ok()
        }))
    };
    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

pub struct Server {
    socket_address: SocketAddr,
    allowed_origins: Vec<String>,
    static_path: PathBuf,
    request_timeout: Duration,
    shutdown_timeout: Duration,
    trace_header: Option<String>,
    storage: Storage,
    prometheus_handle: PrometheusHandle,
}

impl Server {
    pub fn new(
        config: &Configuration,
        storage: Storage,
        prometheus_handle: PrometheusHandle,
    ) -> Self {
        Self {
            socket_address: config.address(),
            allowed_origins: config.allowed_origins.clone(),
            static_path: config.static_path.clone(),
            request_timeout: Duration::from_millis(config.request_timeout),
            shutdown_timeout: Duration::from_secs(config.shutdown_timeout),
            trace_header: config.trace_header.clone(),
            storage,
            prometheus_handle,
        }
    }

    pub async fn from_config(config: Configuration) -> Result<Self, Error> {
        let storage = config.storage.clone().build().await?;
        let prometheus_handle = PrometheusBuilder::new().install_recorder()?;
        Ok(Self::new(&config, storage, prometheus_handle))
    }

    pub fn app(&self) -> axum::Router {
        use axum::extract::Extension;

        tracing::debug!(
            "serving templates on {} and static files from {:?}",
            TEMPLATES_PATH,
            self.static_path
        );
        let router = crate::controller::create()
            .nest_service("/static", ServeDir::new(&self.static_path))
            .fallback_service(ServeDir::new(&self.static_path))
            .layer(Extension(self.storage.clone()))
            .layer(Extension(Arc::new(self.prometheus_handle.clone())))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::INTERNAL_SERVER_ERROR,
                self.request_timeout,
            ));
        let router = match cors_layer(&self.allowed_origins) {
            Some(layer) => router.layer(layer),
            None => router,
        };
        let trace_header = self.trace_header.clone();
        router.layer(
            TraceLayer::new_for_http().make_span_with(move |request: &Request<_>| {
                let trace_id = trace_header
                    .as_deref()
                    .and_then(|name| request.headers().get(name))
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                    trace_id = %trace_id,
                )
            }),
        )
    }

    /// Serves until a termination signal.
    pub async fn run(self) -> Result<(), Error> {
        tracing::info!("starting server on {:?}", self.socket_address);
        let tcp_listener = TcpListener::bind(&self.socket_address)
            .await
            .map_err(|err| Error::Bind(self.socket_address, err))?;
        self.serve(tcp_listener, shutdown_signal()).await
    }

    /// Serves on the given listener until `signal` completes. New connections
    /// are then refused and in-flight requests get the configured grace
    /// period, after which the server stops waiting for them.
    pub async fn serve<F>(self, tcp_listener: TcpListener, signal: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let token = CancellationToken::new();
        let stopped = token.clone();
        let serve = axum::serve(tcp_listener, self.app().into_make_service())
            .with_graceful_shutdown(async move { stopped.cancelled().await });
        let mut task = tokio::spawn(async move { serve.await });

        tokio::select! {
            res = &mut task => return Ok(res??),
            _ = signal => token.cancel(),
        }

        match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
            Ok(res) => Ok(res??),
            Err(_) => {
                tracing::warn!(
                    "in-flight requests still running after {:?}, shutting down anyway",
                    self.shutdown_timeout
                );
                task.abort();
                Ok(())
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("unable to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("unable to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
}
