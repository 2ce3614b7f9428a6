//! Resource bundle keyed by language, namespace and key.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use mapseed_core::error::ClientError;
use serde_json::Value;
use tokio::sync::broadcast;

/// Capacity of the "resource added" broadcast channel.
const ADDED_CHANNEL_CAPACITY: usize = 256;

/// Address of one translated string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationKey {
    /// Language code.
    pub language: String,
    /// Namespace.
    pub namespace: String,
    /// Key within the namespace.
    pub key: String,
}

impl TranslationKey {
    /// Builds a key from its parts.
    #[must_use]
    pub fn new(language: &str, namespace: &str, key: &str) -> Self {
        Self {
            language: language.to_owned(),
            namespace: namespace.to_owned(),
            key: key.to_owned(),
        }
    }
}

type Namespaces = HashMap<String, HashMap<String, String>>;

/// Translated strings: language → namespace → key → text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceBundle {
    resources: HashMap<String, Namespaces>,
}

impl ResourceBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an i18next-style document `{lng: {ns: {key: text}}}`. Nested
    /// objects below the namespace are flattened into dotted keys.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` if a level is not an object
    /// or a leaf is not a string.
    pub fn from_json(document: &Value) -> Result<Self, ClientError> {
        let mut bundle = Self::new();
        let languages = as_object(document, "resource bundle")?;
        for (language, namespaces) in languages {
            for (namespace, entries) in as_object(namespaces, language)? {
                let mut flat = Vec::new();
                flatten(None, entries, &mut flat)?;
                for (key, text) in flat {
                    bundle.add_resource(language, namespace, &key, &text);
                }
            }
        }
        Ok(bundle)
    }

    /// Sets the text for (language, namespace, key). Returns `true` if the
    /// stored value changed.
    pub fn add_resource(&mut self, language: &str, namespace: &str, key: &str, text: &str) -> bool {
        let entries = self
            .resources
            .entry(language.to_owned())
            .or_default()
            .entry(namespace.to_owned())
            .or_default();
        if entries.get(key).map(String::as_str) == Some(text) {
            return false;
        }
        entries.insert(key.to_owned(), text.to_owned());
        true
    }

    /// Text for (language, namespace, key).
    #[must_use]
    pub fn get(&self, language: &str, namespace: &str, key: &str) -> Option<&str> {
        self.resources
            .get(language)?
            .get(namespace)?
            .get(key)
            .map(String::as_str)
    }

    /// All keys known for `language`, across namespaces.
    pub fn keys<'a>(&'a self, language: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.resources
            .get(language)
            .into_iter()
            .flat_map(|namespaces| namespaces.values())
            .flat_map(|entries| entries.keys().map(String::as_str))
    }

    /// Number of stored strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources
            .values()
            .flat_map(HashMap::values)
            .map(HashMap::len)
            .sum()
    }

    /// Returns `true` if the bundle holds no strings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn as_object<'a>(
    value: &'a Value,
    context: &str,
) -> Result<&'a serde_json::Map<String, Value>, ClientError> {
    value.as_object().ok_or_else(|| {
        ClientError::Misconfiguration(format!("expected an object under {context:?}"))
    })
}

fn flatten(prefix: Option<&str>, value: &Value, out: &mut Vec<(String, String)>) -> Result<(), ClientError> {
    match value {
        Value::String(text) => {
            let key = prefix.ok_or_else(|| {
                ClientError::Misconfiguration("namespace must be an object".into())
            })?;
            out.push((key.to_owned(), text.clone()));
            Ok(())
        }
        Value::Object(entries) => {
            for (segment, child) in entries {
                let key = match prefix {
                    Some(prefix) => format!("{prefix}.{segment}"),
                    None => segment.clone(),
                };
                flatten(Some(&key), child, out)?;
            }
            Ok(())
        }
        other => Err(ClientError::Misconfiguration(format!(
            "unsupported value at {:?}: {other}",
            prefix.unwrap_or_default()
        ))),
    }
}

/// A resource bundle shared between lookups and the missing-key resolver.
/// Every change is announced on a broadcast channel so views can re-render.
#[derive(Debug)]
pub struct SharedBundle {
    inner: RwLock<ResourceBundle>,
    added: broadcast::Sender<TranslationKey>,
}

impl SharedBundle {
    /// Wraps `bundle`.
    #[must_use]
    pub fn new(bundle: ResourceBundle) -> Self {
        let (added, _) = broadcast::channel(ADDED_CHANNEL_CAPACITY);
        Self {
            inner: RwLock::new(bundle),
            added,
        }
    }

    /// Text for (language, namespace, key).
    #[must_use]
    pub fn lookup(&self, language: &str, namespace: &str, key: &str) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(language, namespace, key)
            .map(str::to_owned)
    }

    /// Text stored under `key`.
    #[must_use]
    pub fn get(&self, key: &TranslationKey) -> Option<String> {
        self.lookup(&key.language, &key.namespace, &key.key)
    }

    /// Stores `text` under `key` and announces it if the value changed.
    pub fn add_resource(&self, key: &TranslationKey, text: &str) {
        let changed = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add_resource(&key.language, &key.namespace, &key.key, text);
        if changed {
            // No receivers is fine; nobody is rendering yet.
            let _ = self.added.send(key.clone());
        }
    }

    /// Receives every key whose value changes from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TranslationKey> {
        self.added.subscribe()
    }

    /// Copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> ResourceBundle {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
