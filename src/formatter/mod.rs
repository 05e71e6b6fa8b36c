//! Canonical comment-block rendering.

mod block;

pub use block::{render_block, BlockStyle};
