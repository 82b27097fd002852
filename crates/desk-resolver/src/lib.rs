//! Desk Resolver
//!
//! Resolves intents ("edit document `x` of type `y`") against a desk
//! structure and produces the router panes that open it.
//!
//! # Core Concepts
//!
//! - [`PaneResolver`]: session-scoped, memoized resolution of unresolved panes
//! - [`resolve_intent`]: walks the structure and picks the shallowest pane
//!   able to open the target
//! - [`document_group`]: splits the final pane into one sibling per default view
//! - [`PaneResolutionError`]: the single error a resolution can fail with
//!
//! # Example
//!
//! ```rust,ignore
//! use desk_resolver::{resolve_intent, ResolveIntentOptions};
//! use desk_structure::IntentParams;
//!
//! let panes = resolve_intent(
//!     ResolveIntentOptions::new(root, context)
//!         .with_params(IntentParams::new().with("id", "book123").with("type", "book")),
//! )
//! .await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod fallback;
mod pane_resolver;
mod resolve_intent;
mod router;
mod split_panes;

pub use error::PaneResolutionError;
pub use fallback::{fallback_editor_child, fallback_panes};
pub use pane_resolver::{PaneResolver, Resolution};
pub use resolve_intent::{resolve_intent, ResolveIntentOptions};
pub use router::{singleton_groups, RouterPaneGroup, RouterPaneSibling, RouterPanes};
pub use split_panes::document_group;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
