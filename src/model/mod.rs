//! How bodies are arranged over time: per-body timelines of phases, and the
//! per-object frame trees those phases hang off.

pub mod frame_tree;
pub mod timeline;

pub use frame_tree::{FrameTree, FrameTreeBounds};
pub use timeline::{Timeline, TimelinePhase};
