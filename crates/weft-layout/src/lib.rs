// crates/weft-layout/src/lib.rs
//! Flex layout tree for rendered views.
//!
//! Views and their taffy layout nodes live in one arena keyed by [`weft_core::ViewId`], so the
//! presentation tree and the layout tree are updated together and cannot drift apart.

use weft_core::ViewId;

pub mod backend;
pub mod measure;
pub mod taffy_engine;
pub mod taffy_style;

pub use backend::*;
pub use measure::*;
pub use taffy_engine::*;
pub use taffy_style::*;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("View {0} has no layout node")]
    UnknownView(ViewId),

    #[error("View {child} is already attached to view {parent}")]
    AlreadyAttached { child: ViewId, parent: ViewId },

    #[error("Attaching view {child} to view {parent} would create a cycle")]
    Cycle { child: ViewId, parent: ViewId },

    #[error("Cannot attach view {0} to itself")]
    SelfAttach(ViewId),

    #[error("Layout engine error: {0}")]
    Taffy(#[from] taffy::TaffyError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
