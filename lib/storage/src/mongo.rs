use crate::{BuildError, Error, TemplateStore};
use app_creator_prelude::Template;
use futures::TryStreamExt;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::{Client, Collection};

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    /// Connection string, including the credentials.
    pub url: String,
    pub database: String,
    #[serde(default = "Config::default_collection")]
    pub collection: String,
}

impl Config {
    fn default_collection() -> String {
        "templates".into()
    }

    /// The client connects lazily, an unreachable server only shows up on
    /// the first query.
    pub async fn build(self) -> Result<MongoStore, BuildError> {
        tracing::debug!(
            database = %self.database,
            collection = %self.collection,
            "building mongodb template store"
        );
        let client = Client::with_uri_str(&self.url).await.map_err(|err| {
            tracing::error!("unable to configure mongodb client: {:?}", err);
            BuildError::Connection(err)
        })?;
        let collection = client
            .database(&self.database)
            .collection(&self.collection);
        Ok(MongoStore::new(collection))
    }
}

/// Stored shape of a template, the id doubling as primary key.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    template: String,
}

impl From<Template> for TemplateDocument {
    fn from(value: Template) -> Self {
        Self {
            id: value.id,
            name: value.name,
            image_url: value.image_url,
            template: value.template,
        }
    }
}

impl From<TemplateDocument> for Template {
    fn from(value: TemplateDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            image_url: value.image_url,
            template: value.template,
        }
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(inner)) if inner.code == DUPLICATE_KEY
    )
}

fn is_unreachable(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
    )
}

fn classify(err: MongoError) -> Error {
    if is_unreachable(&err) {
        Error::StoreUnavailable(Box::new(err))
    } else {
        Error::StoreQueryFailed(Box::new(err))
    }
}

#[derive(Clone, Debug)]
pub struct MongoStore {
    collection: Collection<TemplateDocument>,
}

impl MongoStore {
    pub fn new(collection: Collection<TemplateDocument>) -> Self {
        Self { collection }
    }
}

#[async_trait::async_trait]
impl TemplateStore for MongoStore {
    async fn list_all(&self) -> Result<Vec<Template>, Error> {
        let cursor = self.collection.find(None, None).await.map_err(|err| {
            tracing::error!("unable to query templates: {:?}", err);
            classify(err)
        })?;
        let found: Vec<TemplateDocument> = cursor.try_collect().await.map_err(|err| {
            tracing::error!("unable to collect templates: {:?}", err);
            classify(err)
        })?;
        Ok(found.into_iter().map(Template::from).collect())
    }

    async fn put(&self, template: Template) -> Result<(), Error> {
        let id = template.id.clone();
        match self
            .collection
            .insert_one(TemplateDocument::from(template), None)
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => {
                tracing::debug!("template {} already exists", id);
                Err(Error::DuplicateId(id))
            }
            Err(err) => {
                tracing::error!("unable to insert template {}: {:?}", id, err);
                Err(classify(err))
            }
        }
    }
}
