//! Error types.
//!
//! The error surface is deliberately narrow: the engine assumes
//! well-formed vnode trees and a host whose operations normally succeed.
//! A render pass that hits either variant aborts loudly; a partially
//! applied mutation set is worse than a stopped one.

use thiserror::Error;

/// Errors surfaced by the reconciler and the application entry point.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An element patch found no host handle on its old node.
    #[error("element <{tag}> has no host node to patch")]
    MissingHost { tag: String },

    /// A host operation failed. Propagated unchanged to the caller of
    /// the patch or mount that issued it; never retried or suppressed.
    #[error("host operation failed: {0}")]
    Host(String),
}
