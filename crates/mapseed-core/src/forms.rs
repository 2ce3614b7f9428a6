//! Form definitions: backend forms supplemented by configured fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::dataset::Dataset;

/// A form definition as a JSON object, from the backend or from config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormRecord(pub Map<String, Value>);

impl FormRecord {
    /// The form identifier, stringified when the backend sends a number.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// URL of the dataset the form submits to.
    #[must_use]
    pub fn dataset_url(&self) -> Option<&str> {
        self.0.get("dataset").and_then(Value::as_str)
    }
}

/// Deployment-level ("flavor") metadata served by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlavorRecord {
    /// Forms catalog, if the flavor defines one.
    #[serde(default)]
    pub forms: Option<Vec<FormRecord>>,
    /// Remaining backend fields.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// A form bound to a loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    /// Form identifier.
    pub id: String,
    /// Backend slug of the dataset.
    pub dataset_slug: String,
    /// Client slug of the dataset.
    pub client_slug: String,
    /// Backend fields overlaid with configured fields.
    pub attributes: Map<String, Value>,
}

/// Combines backend forms with configured supplements and binds each form
/// to its dataset.
///
/// Configured fields win over backend fields for the same form id. Backend
/// forms whose dataset is not loaded are skipped.
#[must_use]
pub fn merge_forms(
    api_forms: &[FormRecord],
    config_forms: &[FormRecord],
    datasets: &[Dataset],
) -> Vec<Form> {
    api_forms
        .iter()
        .filter_map(|api_form| {
            let Some(id) = api_form.id() else {
                warn!("skipping backend form without id");
                return None;
            };
            let Some(dataset) = api_form
                .dataset_url()
                .and_then(|url| datasets.iter().find(|d| d.url() == url))
            else {
                warn!(form = %id, "skipping form for a dataset that is not loaded");
                return None;
            };

            let mut attributes = api_form.0.clone();
            if let Some(supplement) = config_forms
                .iter()
                .find(|config_form| config_form.id().as_deref() == Some(id.as_str()))
            {
                for (field, value) in &supplement.0 {
                    attributes.insert(field.clone(), value.clone());
                }
            }

            Some(Form {
                id,
                dataset_slug: dataset.dataset_slug.clone(),
                client_slug: dataset.client_slug.clone(),
                attributes,
            })
        })
        .collect()
}
