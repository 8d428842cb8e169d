mod openapi;
mod serve;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Server(#[from] crate::service::server::Error),
    #[error("unable to serialize the openapi definition: {0}")]
    OpenApi(#[from] serde_json::Error),
}

#[derive(clap::Subcommand)]
pub enum Action {
    /// Run the app-creator server
    Serve(serve::Action),
    /// Prints the open api schema
    OpenApi(openapi::Action),
}

impl Action {
    pub async fn execute(self) -> Result<(), Error> {
        match self {
            Self::Serve(inner) => inner.execute().await?,
            Self::OpenApi(inner) => inner.execute()?,
        }
        Ok(())
    }
}
