//! Error envelope for intent resolution

use desk_structure::{HelpId, RouterPaneSiblingContext, SerializeError, StructureError};
use std::sync::Arc;

/// Failure surfaced while resolving an intent
///
/// Carries the original failure and the tree position it happened at. The
/// message is the cause's message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct PaneResolutionError {
    message: String,
    context: Box<RouterPaneSiblingContext>,
    help_id: Option<HelpId>,
    #[source]
    cause: Arc<StructureError>,
}

impl PaneResolutionError {
    /// Wrap `cause` raised while resolving the pane at `context`
    #[must_use]
    pub fn new(cause: Arc<StructureError>, context: RouterPaneSiblingContext) -> Self {
        Self {
            message: cause.to_string(),
            help_id: cause.help_id(),
            context: Box::new(context),
            cause,
        }
    }

    /// Get message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get context of the failing pane
    #[inline]
    #[must_use]
    pub fn context(&self) -> &RouterPaneSiblingContext {
        &self.context
    }

    /// Get help reference
    #[inline]
    #[must_use]
    pub fn help_id(&self) -> Option<HelpId> {
        self.help_id
    }

    /// Get original failure
    #[inline]
    #[must_use]
    pub fn cause(&self) -> &StructureError {
        &self.cause
    }

    /// Original failure as a serialization error, if it was one
    #[must_use]
    pub fn serialize_error(&self) -> Option<&SerializeError> {
        self.cause.as_serialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_structure::{PathSegment, StructureContext};

    #[test]
    fn copies_message_and_help_id_from_cause() {
        let cause = SerializeError::new("`id` is required for lists", &[], PathSegment::Index(0), None)
            .with_help_id(HelpId::IdRequired);
        let ctx = RouterPaneSiblingContext::root(Arc::new(StructureContext::empty()));
        let err = PaneResolutionError::new(Arc::new(cause.into()), ctx);

        assert_eq!(err.to_string(), "`id` is required for lists");
        assert_eq!(err.help_id(), Some(HelpId::IdRequired));
        assert_eq!(err.context().id, "root");
        assert!(err.serialize_error().is_some());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn resolver_failures_have_no_help_id() {
        let ctx = RouterPaneSiblingContext::root(Arc::new(StructureContext::empty()));
        let err = PaneResolutionError::new(Arc::new(StructureError::resolver("offline")), ctx);
        assert_eq!(err.message(), "offline");
        assert_eq!(err.help_id(), None);
        assert!(err.serialize_error().is_none());
    }
}
