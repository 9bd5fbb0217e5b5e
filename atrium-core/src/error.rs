//! Error type shared by every atrium crate.

use crate::id::ClassName;
use thiserror::Error;

/// Errors raised while resolving, building or running modules.
///
/// An invalid subscriber is not an error: it is reported through the
/// [`INVALID_SUBSCRIPTION`](crate::INVALID_SUBSCRIPTION) sentinel, and a
/// publish to an event nobody ever subscribed to is
/// [`Published::UnknownEvent`](crate::Published::UnknownEvent).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AtriumError {
    /// The dotted path is malformed or does not name a class.
    #[error("can't find class: {0}")]
    ClassNotFound(String),

    /// A class is reachable from itself through parent declarations.
    #[error("cyclic inheritance at class: {0}")]
    CyclicInheritance(ClassName),

    /// Defining a class would overwrite a namespace or another class.
    #[error("namespace conflict at: {0}")]
    NamespaceConflict(String),

    /// A class already has a parent and cannot declare another one.
    #[error("class {class} already extends {parent}")]
    ParentAlreadyDeclared {
        /// The class whose parent was being declared.
        class: ClassName,
        /// The parent it already has.
        parent: ClassName,
    },

    /// No capability with this name is visible.
    #[error("capability not found: {name}")]
    CapabilityNotFound {
        /// Name that was looked up.
        name: String,
    },

    /// A capability was invoked with arguments it cannot use.
    #[error("invalid argument to {capability}: {message}")]
    InvalidArgument {
        /// The capability that rejected its arguments.
        capability: String,
        /// What was wrong.
        message: String,
    },

    /// The template lookup has no text for this path.
    #[error("can't find template: {0}")]
    TemplateNotFound(String),

    /// The facade startup hook has already run.
    #[error("startup can only run once")]
    StartupAlreadyRun,

    /// A capability needed the composition root after it was dropped.
    #[error("host is no longer available")]
    HostUnavailable,

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AtriumError {
    /// Shorthand for [`AtriumError::InvalidArgument`].
    pub fn invalid_argument(capability: impl Into<String>, message: impl Into<String>) -> Self {
        AtriumError::InvalidArgument {
            capability: capability.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`AtriumError::CapabilityNotFound`].
    pub fn capability_not_found(name: impl Into<String>) -> Self {
        AtriumError::CapabilityNotFound { name: name.into() }
    }
}
