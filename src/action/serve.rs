use crate::service::server::{Configuration, Error, Server};

#[derive(clap::Parser)]
pub struct Action {
    /// Path to the configuration toml file, default to /etc/app-creator/app-creator.toml.
    #[clap(
        short,
        long,
        default_value = "/etc/app-creator/app-creator.toml",
        env = "APP_CREATOR_CONFIG"
    )]
    pub config_path: String,
}

impl Action {
    pub(crate) async fn execute(self) -> Result<(), Error> {
        let config = Configuration::from_path(&self.config_path)?;
        Server::from_config(config).await?.run().await
    }
}
