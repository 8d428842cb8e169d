use crate::controller::swagger::ApiDoc;
use utoipa::OpenApi;

#[derive(clap::Parser)]
pub struct Action {
    /// Pretty prints the openapi definition.
    #[clap(short, long)]
    pub pretty: bool,
}

impl Action {
    pub(crate) fn execute(&self) -> Result<(), serde_json::Error> {
        let api = ApiDoc::openapi();
        if self.pretty {
            println!("{}", api.to_pretty_json()?);
        } else {
            println!("{}", api.to_json()?);
        }
        Ok(())
    }
}
