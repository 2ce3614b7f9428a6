//! Datasets: backend records merged with locally configured fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Submission set that holds the places of a dataset.
pub const PLACES_SUBMISSION_SET: &str = "places";

/// Submission set wildcard in permission entries.
pub const ANY_SUBMISSION_SET: &str = "*";

/// Field names owned by local configuration. These win over backend fields.
const LOCAL_FIELDS: [&str; 5] = [
    "datasetSlug",
    "user",
    "clientSlug",
    "anonymousPermissions",
    "placeConfirmationModal",
];

/// An action a permission entry can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    /// Create submissions.
    Create,
    /// Read submissions.
    Retrieve,
    /// Edit submissions.
    Update,
    /// Delete submissions.
    Destroy,
    /// Read private (protected) submissions.
    CanAccessProtected,
}

/// A set of abilities over one submission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Granted abilities.
    pub abilities: Vec<Ability>,
    /// Submission set the abilities apply to, or `*`.
    pub submission_set: String,
}

impl Permission {
    /// Returns `true` if this entry grants `ability` on `submission_set`.
    #[must_use]
    pub fn grants(&self, ability: Ability, submission_set: &str) -> bool {
        (self.submission_set == submission_set || self.submission_set == ANY_SUBMISSION_SET)
            && self.abilities.contains(&ability)
    }
}

/// A statically configured dataset reference from the flavor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetConfig {
    /// Backend slug of the dataset.
    pub dataset_slug: String,
    /// Owning backend user.
    pub user: String,
    /// Slug used in client-side routes.
    pub client_slug: String,
    /// Permissions granted to every visitor.
    #[serde(default)]
    pub anonymous_permissions: Vec<Permission>,
    /// Confirmation modal shown after a place is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_confirmation_modal: Option<Value>,
}

/// The backend's representation of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetRecord(pub Map<String, Value>);

/// A dataset as used by the client: backend fields enriched with local
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Backend slug of the dataset.
    pub dataset_slug: String,
    /// Owning backend user.
    pub user: String,
    /// Slug used in client-side routes.
    pub client_slug: String,
    /// Permissions granted to every visitor.
    #[serde(default)]
    pub anonymous_permissions: Vec<Permission>,
    /// Confirmation modal shown after a place is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_confirmation_modal: Option<Value>,
    /// Remaining backend-provided fields.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Builds the canonical dataset URL `{api_root}{owner}/datasets/{slug}`.
#[must_use]
pub fn dataset_url(api_root: &str, owner: &str, dataset_slug: &str) -> String {
    format!("{api_root}{owner}/datasets/{dataset_slug}")
}

impl Dataset {
    /// Layers the local `config` over the backend `record`.
    ///
    /// Local fields win on key collision. A missing backend `url` is derived
    /// from `api_root` and the configured owner and slug.
    #[must_use]
    pub fn merge(record: DatasetRecord, config: &DatasetConfig, api_root: &str) -> Self {
        let mut attributes = record.0;
        for field in LOCAL_FIELDS {
            attributes.remove(field);
        }
        if !attributes.get("url").is_some_and(Value::is_string) {
            attributes.insert(
                "url".to_owned(),
                Value::String(dataset_url(api_root, &config.user, &config.dataset_slug)),
            );
        }

        Self {
            dataset_slug: config.dataset_slug.clone(),
            user: config.user.clone(),
            client_slug: config.client_slug.clone(),
            anonymous_permissions: config.anonymous_permissions.clone(),
            place_confirmation_modal: config.place_confirmation_modal.clone(),
            attributes,
        }
    }

    /// Backend URL of the dataset.
    #[must_use]
    pub fn url(&self) -> &str {
        self.attributes
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Display name reported by the backend, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.attributes
            .get("display_name")
            .or_else(|| self.attributes.get("name"))
            .and_then(Value::as_str)
    }

    /// Returns `true` if anonymous visitors hold `ability` on `submission_set`.
    #[must_use]
    pub fn grants_anonymously(&self, ability: Ability, submission_set: &str) -> bool {
        self.anonymous_permissions
            .iter()
            .any(|permission| permission.grants(ability, submission_set))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config() -> DatasetConfig {
        DatasetConfig {
            dataset_slug: "A".into(),
            user: "alice".into(),
            client_slug: "reports".into(),
            anonymous_permissions: vec![Permission {
                abilities: vec![Ability::Create],
                submission_set: PLACES_SUBMISSION_SET.into(),
            }],
            place_confirmation_modal: Some(json!({"header": "Thanks!"})),
        }
    }

    fn record(value: Value) -> DatasetRecord {
        match value {
            Value::Object(map) => DatasetRecord(map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_merge_keeps_backend_fields_and_adds_local_fields() {
        // Arrange
        let backend = record(json!({
            "name": "Dataset A",
            "url": "http://api.test/alice/datasets/A",
            "places": {"length": 12},
        }));

        // Act
        let dataset = Dataset::merge(backend, &config(), "http://api.test/");

        // Assert
        assert_eq!(dataset.name(), Some("Dataset A"));
        assert_eq!(dataset.url(), "http://api.test/alice/datasets/A");
        assert_eq!(dataset.dataset_slug, "A");
        assert_eq!(dataset.client_slug, "reports");
        assert_eq!(dataset.anonymous_permissions, config().anonymous_permissions);
        assert_eq!(dataset.attributes["places"], json!({"length": 12}));
    }

    #[test]
    fn test_merge_local_fields_win_on_collision() {
        let backend = record(json!({
            "name": "Dataset A",
            "clientSlug": "backend-slug",
            "anonymousPermissions": [],
            "placeConfirmationModal": false,
        }));

        let dataset = Dataset::merge(backend, &config(), "http://api.test/");
        let serialized = serde_json::to_value(&dataset).unwrap();

        assert_eq!(serialized["clientSlug"], "reports");
        assert_eq!(serialized["placeConfirmationModal"], json!({"header": "Thanks!"}));
        assert_eq!(
            serialized["anonymousPermissions"],
            json!([{"abilities": ["create"], "submission_set": "places"}])
        );
        assert_eq!(serialized["datasetSlug"], "A");
        assert_eq!(serialized["name"], "Dataset A");
    }

    #[test]
    fn test_merge_derives_missing_url() {
        let dataset = Dataset::merge(DatasetRecord::default(), &config(), "http://api.test/");

        assert_eq!(dataset.url(), "http://api.test/alice/datasets/A");
    }

    #[test]
    fn test_wildcard_permission_grants_any_submission_set() {
        let permission = Permission {
            abilities: vec![Ability::Create, Ability::Update],
            submission_set: ANY_SUBMISSION_SET.into(),
        };

        assert!(permission.grants(Ability::Create, "comments"));
        assert!(permission.grants(Ability::Update, PLACES_SUBMISSION_SET));
        assert!(!permission.grants(Ability::Destroy, PLACES_SUBMISSION_SET));
    }
}
