//! Server-render integration for the aquifer cache.
//!
//! This crate provides:
//! - `ElementRenderer` - the seam to an external component-tree renderer
//! - `collect` - drive one render pass, wait for every pending fetch, and
//!   return the serializable snapshot used for client hydration

mod renderer;
mod walker;

pub use renderer::{ElementRenderer, FnRenderer};
pub use walker::collect;
