//! The element renderer seam.

use std::marker::PhantomData;

use async_trait::async_trait;

/// Drives one traversal of a component tree.
///
/// Only the traversal's side effects matter to the cache: mounting
/// consumer bindings registers subscriptions and may start fetches. The
/// output markup is not required. Implementations may render synchronously
/// or as a stream; `drive` returns once one full pass over `root` has
/// executed.
#[async_trait]
pub trait ElementRenderer {
    /// Root element type for the traversal.
    type Root: Send + 'static;

    /// Execute one render pass over `root` for its side effects.
    async fn drive(&mut self, root: Self::Root);
}

/// Renderer backed by a synchronous closure, for traversals that complete
/// in one call.
pub struct FnRenderer<F, R> {
    render: F,
    _root: PhantomData<fn(R)>,
}

impl<F, R> FnRenderer<F, R>
where
    F: FnMut(R),
{
    /// Wrap a closure that performs one pass over a root element.
    pub fn new(render: F) -> Self {
        Self {
            render,
            _root: PhantomData,
        }
    }
}

#[async_trait]
impl<F, R> ElementRenderer for FnRenderer<F, R>
where
    F: FnMut(R) + Send,
    R: Send + 'static,
{
    type Root = R;

    async fn drive(&mut self, root: R) {
        (self.render)(root);
    }
}
