use std::io::Write;

/// A layout fragment of the app builder.
///
/// The `template` field holds the serialized component tree. It is carried as
/// an opaque string and never parsed on this side.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[cfg_attr(feature = "utoipa", schema(example = "left-side-panel"))]
    #[serde(default)]
    pub id: String,
    #[cfg_attr(feature = "utoipa", schema(example = "Left Side Panel"))]
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[cfg_attr(feature = "utoipa", schema(example = "{\"widgets\":{}}"))]
    #[serde(default)]
    pub template: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unable to parse template: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("template identifier is missing")]
    MissingId,
}

#[derive(Debug, thiserror::Error)]
#[error("unable to encode templates: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

impl Template {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        image_url: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image_url: image_url.into(),
            template: template.into(),
        }
    }

    /// Parses a single JSON object. Unknown keys are ignored and missing
    /// optional keys are left empty, but the identifier is mandatory.
    pub fn decode(input: &[u8]) -> Result<Self, DecodeError> {
        let template: Self = serde_json::from_slice(input)?;
        template.ensure_identified()?;
        Ok(template)
    }

    /// Streams the JSON object into the writer.
    pub fn encode<W: Write>(&self, writer: W) -> Result<(), EncodeError> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    fn ensure_identified(&self) -> Result<(), DecodeError> {
        if self.id.is_empty() {
            Err(DecodeError::MissingId)
        } else {
            Ok(())
        }
    }
}

/// Streams a collection as a bare JSON array.
pub fn encode_collection<W: Write>(templates: &[Template], writer: W) -> Result<(), EncodeError> {
    serde_json::to_writer(writer, templates)?;
    Ok(())
}

pub fn decode_collection(input: &[u8]) -> Result<Vec<Template>, DecodeError> {
    let templates: Vec<Template> = serde_json::from_slice(input)?;
    templates
        .iter()
        .try_for_each(Template::ensure_identified)?;
    Ok(templates)
}
