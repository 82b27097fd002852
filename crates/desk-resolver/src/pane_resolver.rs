//! Memoized pane resolution
//!
//! One [`PaneResolver`] lives for exactly one intent resolution. It turns
//! unresolved nodes into concrete ones and remembers every in-flight or
//! finished resolution by `(node identity, path)`, so a shared node reached
//! twice at the same position is only resolved once, even when both requests
//! race.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use desk_structure::{PaneNode, RouterPaneSiblingContext, SerializeOptions, StructureError, UnresolvedPaneNode};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::sync::Arc;
use tracing::debug;

/// Outcome of resolving one node, shareable between waiters
pub type Resolution = Result<Arc<PaneNode>, Arc<StructureError>>;

type SharedResolution = Shared<BoxFuture<'static, Resolution>>;

type CacheKey = (usize, Vec<String>);

struct CacheEntry {
    // Holds the node alive so its identity cannot be reused by another
    // allocation while the session runs.
    _node: UnresolvedPaneNode,
    resolution: SharedResolution,
}

/// Session-scoped resolver with at-most-once resolution per key
#[derive(Clone, Default)]
pub struct PaneResolver {
    cache: Arc<DashMap<CacheKey, CacheEntry>>,
}

impl PaneResolver {
    /// Create resolver with an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `node` at the position described by `ctx`
    ///
    /// Concrete nodes come back as they are, builders are serialized at
    /// `ctx.path` and `flat_index`, resolver functions are called with
    /// `ctx` and their output is resolved in turn.
    ///
    /// # Errors
    /// Returns the builder's or resolver function's failure unchanged, or
    /// [`StructureError::NoChild`] when a resolver function produced nothing.
    pub async fn resolve(
        &self,
        node: &UnresolvedPaneNode,
        ctx: &RouterPaneSiblingContext,
        flat_index: usize,
    ) -> Resolution {
        let key = (node.identity(), ctx.path.clone());
        let resolution = match self.cache.entry(key) {
            Entry::Occupied(entry) => {
                debug!(path = ?ctx.path, id = %ctx.id, "Pane cache hit");
                entry.get().resolution.clone()
            }
            Entry::Vacant(entry) => {
                debug!(path = ?ctx.path, id = %ctx.id, "Pane cache miss");
                let resolution = resolve_uncached(node.clone(), ctx.clone(), flat_index).shared();
                entry.insert(CacheEntry {
                    _node: node.clone(),
                    resolution: resolution.clone(),
                });
                resolution
            }
        };
        resolution.await
    }

    /// Number of distinct resolutions started in this session
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if nothing has been resolved yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl std::fmt::Debug for PaneResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaneResolver").field("entries", &self.cache.len()).finish()
    }
}

fn resolve_uncached(
    node: UnresolvedPaneNode,
    ctx: RouterPaneSiblingContext,
    flat_index: usize,
) -> BoxFuture<'static, Resolution> {
    async move {
        match node {
            UnresolvedPaneNode::Node(node) => Ok(node),
            UnresolvedPaneNode::Builder(builder) => {
                let options = SerializeOptions::at(ctx.path.clone()).with_index(flat_index);
                builder
                    .serialize(&options)
                    .map(Arc::new)
                    .map_err(|err| Arc::new(StructureError::from(err)))
            }
            UnresolvedPaneNode::Resolver(resolver) => {
                let output = resolver.call(&ctx.id, &ctx).first().await.map_err(Arc::new)?;
                let next = output.ok_or_else(|| Arc::new(StructureError::NoChild))?;
                resolve_uncached(next, ctx, flat_index).await
            }
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_structure::{ResolverOutput, SerializePane, StructureBuilder, StructureContext};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn root() -> RouterPaneSiblingContext {
        RouterPaneSiblingContext::root(Arc::new(StructureContext::empty()))
    }

    #[tokio::test]
    async fn concrete_nodes_pass_through() {
        let ctx = root();
        let s = StructureBuilder::new(Arc::clone(&ctx.structure_context));
        let node = Arc::new(
            s.component()
                .with_id("c")
                .with_component("Widget")
                .serialize(&SerializeOptions::default())
                .unwrap(),
        );
        let resolved = PaneResolver::new()
            .resolve(&UnresolvedPaneNode::Node(Arc::clone(&node)), &ctx, 0)
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&resolved, &node));
    }

    #[tokio::test]
    async fn resolver_functions_run_once_per_position() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let node = UnresolvedPaneNode::resolver(move |_, ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            let s = StructureBuilder::new(Arc::clone(&ctx.structure_context));
            ResolverOutput::ready(s.component().with_id("c").with_component("Widget"))
        });

        let resolver = PaneResolver::new();
        let ctx = root();
        let a = resolver.resolve(&node, &ctx, 0).await.unwrap();
        let b = resolver.resolve(&node, &ctx, 0).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.len(), 1);
    }

    #[tokio::test]
    async fn empty_output_is_no_child() {
        let node = UnresolvedPaneNode::resolver(|_, _| ResolverOutput::none());
        let err = PaneResolver::new().resolve(&node, &root(), 0).await.unwrap_err();
        assert!(matches!(*err, StructureError::NoChild));
    }
}
