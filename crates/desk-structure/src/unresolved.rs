//! Unresolved pane nodes
//!
//! A pane can be given as a finished node, as a builder that still has to be
//! serialized, or as a resolver function. Resolver functions may answer right
//! away, with a future, or with a stream of which only the first item counts.
//! [`ResolverOutput::first`] folds all three into one future.

use crate::builder::SerializePane;
use crate::context::StructureContext;
use crate::error::StructureError;
use crate::node::PaneNode;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{Future, Stream, StreamExt};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// What a resolver function produces once settled
pub type ResolverResult = Result<Option<UnresolvedPaneNode>, StructureError>;

/// Output of a resolver function in any of its flavors
pub enum ResolverOutput {
    Ready(ResolverResult),
    Pending(BoxFuture<'static, ResolverResult>),
    Stream(BoxStream<'static, ResolverResult>),
}

impl ResolverOutput {
    /// Output available right away
    pub fn ready(node: impl Into<UnresolvedPaneNode>) -> Self {
        Self::Ready(Ok(Some(node.into())))
    }

    /// No child
    #[must_use]
    pub fn none() -> Self {
        Self::Ready(Ok(None))
    }

    /// Output produced by a future
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = ResolverResult> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }

    /// Output produced by the first item of a stream
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = ResolverResult> + Send + 'static,
    {
        Self::Stream(Box::pin(stream))
    }

    /// Settle the output; streams are dropped after their first item
    pub async fn first(self) -> ResolverResult {
        match self {
            Self::Ready(result) => result,
            Self::Pending(future) => future.await,
            Self::Stream(mut stream) => stream.next().await.transpose().map(Option::flatten),
        }
    }
}

impl fmt::Debug for ResolverOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

type ResolverFn = dyn Fn(&str, &RouterPaneSiblingContext) -> ResolverOutput + Send + Sync;

/// Function resolving the child pane for a path segment
#[derive(Clone)]
pub struct ChildResolver(Arc<ResolverFn>);

impl ChildResolver {
    /// Wrap a resolver function
    pub fn new<F>(resolve: F) -> Self
    where
        F: Fn(&str, &RouterPaneSiblingContext) -> ResolverOutput + Send + Sync + 'static,
    {
        Self(Arc::new(resolve))
    }

    /// Call with the segment id being resolved
    #[inline]
    #[must_use]
    pub fn call(&self, id: &str, ctx: &RouterPaneSiblingContext) -> ResolverOutput {
        (self.0)(id, ctx)
    }

    fn identity(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl fmt::Debug for ChildResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChildResolver({:#x})", self.identity())
    }
}

/// Pane that may still need work before it can be shown
#[derive(Clone)]
pub enum UnresolvedPaneNode {
    Node(Arc<PaneNode>),
    Builder(Arc<dyn SerializePane>),
    Resolver(ChildResolver),
}

impl UnresolvedPaneNode {
    /// Resolver function node
    pub fn resolver<F>(resolve: F) -> Self
    where
        F: Fn(&str, &RouterPaneSiblingContext) -> ResolverOutput + Send + Sync + 'static,
    {
        Self::Resolver(ChildResolver::new(resolve))
    }

    /// Builder node
    pub fn builder(builder: impl SerializePane + 'static) -> Self {
        Self::Builder(Arc::new(builder))
    }

    /// Stable identity of the shared allocation behind this node
    ///
    /// Clones share an identity; separately created nodes never do while both
    /// are alive.
    #[must_use]
    pub fn identity(&self) -> usize {
        match self {
            Self::Node(node) => Arc::as_ptr(node).cast::<()>() as usize,
            Self::Builder(builder) => Arc::as_ptr(builder).cast::<()>() as usize,
            Self::Resolver(resolver) => resolver.identity(),
        }
    }
}

impl fmt::Debug for UnresolvedPaneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node) => f.debug_tuple("Node").field(&node.id()).finish(),
            Self::Builder(_) => write!(f, "Builder({:#x})", self.identity()),
            Self::Resolver(resolver) => resolver.fmt(f),
        }
    }
}

impl From<PaneNode> for UnresolvedPaneNode {
    fn from(node: PaneNode) -> Self {
        Self::Node(Arc::new(node))
    }
}

impl From<Arc<PaneNode>> for UnresolvedPaneNode {
    fn from(node: Arc<PaneNode>) -> Self {
        Self::Node(node)
    }
}

impl From<ChildResolver> for UnresolvedPaneNode {
    fn from(resolver: ChildResolver) -> Self {
        Self::Resolver(resolver)
    }
}

/// Where in the tree a pane is being resolved
///
/// Created fresh for every visited node and never changed afterwards.
#[derive(Debug, Clone)]
pub struct RouterPaneSiblingContext {
    /// Path segment being resolved
    pub id: String,
    /// Position among split-pane siblings
    pub split_index: usize,
    /// Already resolved parent, `None` at the root
    pub parent: Option<Arc<PaneNode>>,
    /// Ancestor ids
    pub path: Vec<String>,
    /// Flat traversal counter
    pub index: usize,
    pub params: IndexMap<String, String>,
    pub payload: Option<serde_json::Value>,
    pub structure_context: Arc<StructureContext>,
}

impl RouterPaneSiblingContext {
    /// Context for the root pane
    #[must_use]
    pub fn root(structure_context: Arc<StructureContext>) -> Self {
        Self {
            id: "root".to_string(),
            split_index: 0,
            parent: None,
            path: Vec::new(),
            index: 0,
            params: IndexMap::new(),
            payload: None,
            structure_context,
        }
    }

    /// Context for the child `id` of an already resolved `parent`
    #[must_use]
    pub fn child(&self, id: impl Into<String>, parent: Arc<PaneNode>) -> Self {
        let id = id.into();
        let mut path = self.path.clone();
        path.push(id.clone());
        Self {
            id,
            split_index: 0,
            parent: Some(parent),
            path,
            index: self.index + 1,
            params: IndexMap::new(),
            payload: None,
            structure_context: Arc::clone(&self.structure_context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn context() -> RouterPaneSiblingContext {
        RouterPaneSiblingContext::root(Arc::new(StructureContext::empty()))
    }

    #[tokio::test]
    async fn stream_output_takes_first_item() {
        let ctx = context();
        let resolver = ChildResolver::new(|_, _| {
            ResolverOutput::stream(stream::iter(vec![
                Ok(Some(UnresolvedPaneNode::resolver(|_, _| ResolverOutput::none()))),
                Err(StructureError::resolver("never reached")),
            ]))
        });
        let first = resolver.call("x", &ctx).first().await.unwrap();
        assert!(matches!(first, Some(UnresolvedPaneNode::Resolver(_))));
    }

    #[tokio::test]
    async fn empty_stream_settles_to_nothing() {
        let ctx = context();
        let resolver = ChildResolver::new(|_, _| ResolverOutput::stream(stream::empty()));
        assert!(resolver.call("x", &ctx).first().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn pending_output_is_awaited() {
        let ctx = context();
        let resolver = ChildResolver::new(|_, _| {
            ResolverOutput::pending(async { ResolverResult::Err(StructureError::resolver("boom")) })
        });
        let err = resolver.call("x", &ctx).first().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn clones_share_identity() {
        let node = UnresolvedPaneNode::resolver(|_, _| ResolverOutput::none());
        let other = UnresolvedPaneNode::resolver(|_, _| ResolverOutput::none());
        assert_eq!(node.identity(), node.clone().identity());
        assert_ne!(node.identity(), other.identity());
    }

    #[test]
    fn child_context_extends_path_and_index() {
        let root = context();
        let parent = Arc::new(
            crate::StructureBuilder::new(Arc::clone(&root.structure_context))
                .document()
                .with_document_id("a")
                .with_schema_type("book")
                .serialize(&crate::SerializeOptions::default())
                .unwrap(),
        );
        let child = root.child("books", parent);
        assert_eq!(child.path, vec!["books"]);
        assert_eq!(child.index, 1);
        assert!(child.parent.is_some());
    }
}
