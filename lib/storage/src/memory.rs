use crate::{BuildError, Error, TemplateStore};
use app_creator_prelude::{decode_collection, Template};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct Config {
    /// JSON array of templates loaded when the store is created.
    #[serde(default)]
    pub seed: Option<PathBuf>,
}

impl Config {
    pub async fn build(self) -> Result<MemoryStore, BuildError> {
        tracing::debug!("building memory template store");
        let Some(path) = self.seed else {
            return Ok(MemoryStore::default());
        };
        let content = tokio::fs::read(&path).await.map_err(|err| {
            tracing::error!("unable to read seed file {:?}: {:?}", path, err);
            BuildError::SeedUnreadable(err)
        })?;
        let templates = decode_collection(&content).map_err(|err| {
            tracing::error!("unable to decode seed file {:?}: {:?}", path, err);
            BuildError::SeedInvalid(err)
        })?;
        tracing::info!("seeded memory store with {} templates", templates.len());
        Ok(MemoryStore::from_iter(templates))
    }
}

/// Templates kept in process memory, keyed by id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    templates: RwLock<BTreeMap<String, Template>>,
}

impl FromIterator<Template> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Template>>(iter: I) -> Self {
        Self {
            templates: RwLock::new(
                iter.into_iter()
                    .map(|item| (item.id.clone(), item))
                    .collect(),
            ),
        }
    }
}

#[async_trait::async_trait]
impl TemplateStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Template>, Error> {
        let templates = self.templates.read().await;
        Ok(templates.values().cloned().collect())
    }

    async fn put(&self, template: Template) -> Result<(), Error> {
        let mut templates = self.templates.write().await;
        match templates.entry(template.id.clone()) {
            Entry::Occupied(_) => {
                tracing::debug!("template {} already exists", template.id);
                Err(Error::DuplicateId(template.id))
            }
            Entry::Vacant(entry) => {
                entry.insert(template);
                Ok(())
            }
        }
    }
}
