//! Harvester core: pure bookkeeping for resumable profile harvesting.
mod content;
mod ordered_set;
mod profile;
mod registry;
mod snapshot;

pub use content::{Content, ContentKind};
pub use ordered_set::OrderedSet;
pub use profile::Profile;
pub use registry::{PendingCursor, PendingPosts, PostRegistry, PostStatus};
pub use snapshot::ProgressSnapshot;
