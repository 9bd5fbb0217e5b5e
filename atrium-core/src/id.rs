//! Typed identifiers for classes and events.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Declares a string newtype used as a lookup key.
///
/// Class paths and event names share a representation but never a table, so
/// each gets its own type. Both serialize as bare strings and borrow as
/// `str`, which lets maps keyed by them be queried with a plain `&str`.
macro_rules! name_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a string.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// The underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }
    };
}

name_type! {
    /// Dotted namespace path of a class, e.g. `app.model.Greeting`. Only
    /// checked for well-formedness when it is resolved.
    ClassName
}

name_type! {
    /// Name of a broadcast event.
    EventName
}

impl ClassName {
    /// The dot-separated segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The last segment of the path (the short class name).
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// True if the path is non-empty and has no empty segments.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty() && self.segments().all(|s| !s.is_empty())
    }
}
