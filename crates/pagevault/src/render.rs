//! The fragment rendering seam.
//!
//! The engine decides *what* happens to each fragment; the embedding
//! layer decides *how* it appears. [`Renderer`] is that seam: substitute
//! plaintext, substitute a denied placeholder, or navigate away.

use async_trait::async_trait;
use pagevault_core::ResourceId;

/// How the embedding layer applies rendering decisions to the page.
///
/// Implementations are infallible: a renderer that cannot touch its
/// output has nothing useful to report back to the policy pass.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Replace the fragment's placeholder with decrypted content.
    async fn substitute_fragment(&self, resource_id: &ResourceId, content: &str);

    /// Replace the fragment's placeholder with the denied placeholder.
    async fn substitute_with_placeholder(&self, resource_id: &ResourceId, placeholder: &str);

    /// Navigate the whole page to the given location.
    async fn navigate(&self, location: &str);
}

/// Outcome of one fragment pass over a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every fragment was authorized and substituted.
    AllApproved,
    /// At least one fragment was denied, but the page survived.
    SomeDenied,
    /// A denied fragment forced a redirect; the pass stopped there.
    Redirected,
}
