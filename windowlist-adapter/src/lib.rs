//! Host glue for the `windowlist` engine.
//!
//! The `windowlist` crate is UI-agnostic and focuses on the core math and
//! state. This crate provides the pieces that face a real host UI:
//!
//! - Container discovery via an injected probe, retried until the scroll
//!   element mounts (tab panels and lazy routes mount it late)
//! - Viewport tracking (scroll offset + visible height) with teardown-safe
//!   subscriptions
//! - Per-item size observation feeding measurements back into the engine
//! - A [`VirtualList`] controller tying it all together behind the same
//!   surface as the engine: `is_ready` / `virtual_items` / `total_size`
//!
//! It is framework-neutral: hosts implement [`ScrollArea`] and [`ItemHandle`]
//! over whatever element type they have, and drive [`VirtualList::tick`]
//! from their frame or timer loop.
#![forbid(unsafe_code)]

mod attach;
mod element;
mod items;
mod list;
mod tracker;


pub use attach::{AttachState, AttachmentResolver, DEFAULT_RETRY_DELAY_MS};
pub use element::{
    ItemHandle, ResizeListener, ScrollArea, ScrollListener, ScrollProbe, Subscription,
};
pub use items::{ItemObservers, MeasureQueue};
pub use list::{EndReachedCallback, VirtualList, VirtualListOptions};
pub use tracker::ViewportTracker;
