//! Runtime configuration.

use atrium_core::history::DEFAULT_HISTORY_LIMIT;
use atrium_core::{AtriumError, ClassName};
use serde::{Deserialize, Serialize};

/// Class path the facade is built from unless configured otherwise.
pub const DEFAULT_FACADE_CLASS: &str = "app.Facade";

/// Settings for a [`Facade`](crate::Facade).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use atrium_facade::AtriumConfig;
///
/// let config = AtriumConfig::from_json(r#"{"history_limit": 8}"#).unwrap();
/// assert_eq!(config.history_limit, 8);
/// assert_eq!(config.facade_class.as_str(), "app.Facade");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtriumConfig {
    /// Maximum page-history entries; the oldest are dropped first.
    pub history_limit: usize,
    /// Class path of the application's facade class.
    pub facade_class: ClassName,
}

impl Default for AtriumConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            facade_class: ClassName::from(DEFAULT_FACADE_CLASS),
        }
    }
}

impl AtriumConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self, AtriumError> {
        serde_json::from_str(json).map_err(|e| AtriumError::Other(Box::new(e)))
    }

    /// Set the page-history limit.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set the facade class path.
    pub fn with_facade_class(mut self, class: impl Into<ClassName>) -> Self {
        self.facade_class = class.into();
        self
    }
}
