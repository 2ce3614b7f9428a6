//! Cookie store contract.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Cookie holding the backend session identifier.
pub const SESSION_COOKIE_NAME: &str = "sa-api-sessionid";

/// Read/write access to named cookies.
pub trait CookieStore: Send + Sync {
    /// Returns the value of cookie `name`.
    fn get(&self, name: &str) -> Option<String>;

    /// Sets cookie `name` to `value`.
    fn set(&self, name: &str, value: &str);
}

/// Process-local cookie jar.
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    cookies: Mutex<HashMap<String, String>>,
}

impl MemoryCookieStore {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn set(&self, name: &str, value: &str) {
        self.cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), value.to_owned());
    }
}
