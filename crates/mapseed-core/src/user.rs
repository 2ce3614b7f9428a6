//! User identity and permission checks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dataset::{Ability, Dataset, PLACES_SUBMISSION_SET, Permission};

/// Avatar shown when the backend supplies none.
pub const DEFAULT_AVATAR_URL: &str = "/static/css/images/user-50.png";

/// A group membership scoped to one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// URL of the dataset the group belongs to.
    pub dataset: String,
    /// Group name.
    pub name: String,
    /// Permissions granted to members.
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// The authenticated user as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Numeric backend identifier.
    pub id: u64,
    /// Login name.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Group memberships.
    #[serde(default)]
    pub groups: Vec<Group>,
    /// Remaining backend fields.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// The canonical user record. Replaced as a whole, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Request-correlation token: `user:{id}` or `session:{cookie}`.
    pub token: String,
    /// Backend identifier, authenticated users only.
    pub id: Option<u64>,
    /// Login name, authenticated users only.
    pub username: Option<String>,
    /// Display name, authenticated users only.
    pub name: Option<String>,
    /// Avatar image URL.
    pub avatar_url: String,
    /// Group memberships; empty for anonymous users.
    pub groups: Vec<Group>,
    /// Whether the user is logged in.
    pub is_authenticated: bool,
    /// Remaining backend fields.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl User {
    /// Builds the record for a logged-in user.
    #[must_use]
    pub fn authenticated(record: UserRecord) -> Self {
        let name = record.name.unwrap_or_else(|| record.username.clone());
        Self {
            token: format!("user:{}", record.id),
            id: Some(record.id),
            name: Some(name),
            username: Some(record.username),
            avatar_url: record
                .avatar_url
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_owned()),
            groups: record.groups,
            is_authenticated: true,
            attributes: record.attributes,
        }
    }

    /// Builds the record for an anonymous visitor identified by the session
    /// cookie. A missing cookie yields the bare `session:` token.
    #[must_use]
    pub fn anonymous(session_id: Option<&str>) -> Self {
        Self {
            token: format!("session:{}", session_id.unwrap_or_default()),
            id: None,
            username: None,
            name: None,
            avatar_url: DEFAULT_AVATAR_URL.to_owned(),
            groups: Vec::new(),
            is_authenticated: false,
            attributes: Map::new(),
        }
    }

    /// Returns `true` if one of the user's groups on `dataset` grants
    /// `ability` on `submission_set`.
    #[must_use]
    pub fn has_group_permission(
        &self,
        dataset: &Dataset,
        ability: Ability,
        submission_set: &str,
    ) -> bool {
        self.groups
            .iter()
            .filter(|group| group.dataset == dataset.url())
            .flat_map(|group| group.permissions.iter())
            .any(|permission| permission.grants(ability, submission_set))
    }

    /// Returns `true` if the user may perform `ability` on `submission_set`,
    /// either through the dataset's anonymous permissions or a group.
    #[must_use]
    pub fn can(&self, dataset: &Dataset, ability: Ability, submission_set: &str) -> bool {
        dataset.grants_anonymously(ability, submission_set)
            || self.has_group_permission(dataset, ability, submission_set)
    }
}

/// Datasets in which `user` may create places.
#[must_use]
pub fn datasets_with_create_places_ability(user: &User, datasets: &[Dataset]) -> Vec<Dataset> {
    datasets
        .iter()
        .filter(|dataset| user.can(dataset, Ability::Create, PLACES_SUBMISSION_SET))
        .cloned()
        .collect()
}

/// Datasets in which `user` may read protected places. Only group
/// memberships grant this.
#[must_use]
pub fn datasets_with_access_protected_places_ability(
    user: &User,
    datasets: &[Dataset],
) -> Vec<Dataset> {
    datasets
        .iter()
        .filter(|dataset| {
            user.has_group_permission(dataset, Ability::CanAccessProtected, PLACES_SUBMISSION_SET)
        })
        .cloned()
        .collect()
}
